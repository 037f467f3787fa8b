use crate::ai_provider::AiTransport;
use crate::error::Result;

/// Capability interface over whatever speech device is available.
///
/// The meditation flow depends only on this trait, never on a concrete
/// device API.
pub trait SpeechSynthesizer {
    fn speak(&mut self, text: &str);
    fn pause(&mut self);
    fn resume(&mut self);
    fn cancel(&mut self);
    fn is_speaking(&self) -> bool;
}

/// Console fallback: prints the text instead of speaking it.
#[derive(Default)]
pub struct ConsoleSpeech {
    speaking: bool,
}

impl ConsoleSpeech {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SpeechSynthesizer for ConsoleSpeech {
    fn speak(&mut self, text: &str) {
        println!("{}", text);
        self.speaking = true;
    }

    fn pause(&mut self) {}

    fn resume(&mut self) {}

    fn cancel(&mut self) {
        self.speaking = false;
    }

    fn is_speaking(&self) -> bool {
        self.speaking
    }
}

/// A guided-meditation session: fetch the script for a topic, speak it,
/// and guarantee speech stops when the session closes.
pub struct MeditationSession<S: SpeechSynthesizer> {
    pub topic: String,
    pub script: Option<String>,
    speech: S,
}

impl<S: SpeechSynthesizer> MeditationSession<S> {
    pub fn new(topic: impl Into<String>, speech: S) -> Self {
        MeditationSession {
            topic: topic.into(),
            script: None,
            speech,
        }
    }

    /// Fetch the script and start speaking it.
    pub async fn start<T: AiTransport>(&mut self, transport: &T) -> Result<()> {
        let script = transport.get_meditation_script(&self.topic).await?;
        self.speech.speak(&script);
        self.script = Some(script);
        Ok(())
    }

    /// Closing the session stops any in-progress speech.
    pub fn close(&mut self) {
        self.speech.cancel();
    }

    pub fn is_speaking(&self) -> bool {
        self.speech.is_speaking()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Message;
    use crate::mood::MoodEntry;
    use crate::streak::StreakRecord;
    use crate::ai_provider::Song;

    /// Records every call for assertions.
    #[derive(Default)]
    struct RecordingSpeech {
        spoken: Vec<String>,
        cancelled: bool,
        speaking: bool,
    }

    impl SpeechSynthesizer for RecordingSpeech {
        fn speak(&mut self, text: &str) {
            self.spoken.push(text.to_string());
            self.speaking = true;
        }

        fn pause(&mut self) {}

        fn resume(&mut self) {}

        fn cancel(&mut self) {
            self.cancelled = true;
            self.speaking = false;
        }

        fn is_speaking(&self) -> bool {
            self.speaking
        }
    }

    struct ScriptTransport;

    impl AiTransport for ScriptTransport {
        async fn get_reply(
            &self,
            _history: &[Message],
            _mood_log: &[MoodEntry],
            _scenario: Option<&str>,
            _streak: &StreakRecord,
        ) -> crate::error::Result<String> {
            Ok(String::new())
        }

        async fn get_meditation_script(&self, topic: &str) -> crate::error::Result<String> {
            Ok(format!("Close your eyes and think about {}.", topic))
        }

        async fn get_playlist(&self, _theme: &str) -> crate::error::Result<Vec<Song>> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn test_session_speaks_fetched_script() {
        let mut session = MeditationSession::new("letting go", RecordingSpeech::default());
        session.start(&ScriptTransport).await.unwrap();

        assert!(session.script.as_deref().unwrap().contains("letting go"));
        assert!(session.is_speaking());
    }

    #[tokio::test]
    async fn test_close_cancels_in_progress_speech() {
        let mut session = MeditationSession::new("sleep", RecordingSpeech::default());
        session.start(&ScriptTransport).await.unwrap();
        assert!(session.is_speaking());

        session.close();
        assert!(!session.is_speaking());
    }
}
