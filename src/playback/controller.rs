//! Single-flight playback across a list of items.

use std::collections::HashMap;

use super::PlaybackError;

/// Something that can play one piece of audio.
pub trait AudioSink {
    /// Start playing from the beginning.
    fn play(&mut self) -> Result<(), PlaybackError>;

    /// Pause and rewind. Stopping an idle sink is a no-op.
    fn stop(&mut self);

    /// False once playback has finished or was stopped.
    fn is_playing(&mut self) -> bool;
}

/// Plays at most one item at a time.
///
/// Sinks are created lazily, one per item id, and reused on later plays.
pub struct PlaybackController<S, F>
where
    S: AudioSink,
    F: FnMut(&str) -> Result<S, PlaybackError>,
{
    sinks: HashMap<String, S>,
    open: F,
    current: Option<String>,
}

impl<S, F> PlaybackController<S, F>
where
    S: AudioSink,
    F: FnMut(&str) -> Result<S, PlaybackError>,
{
    /// `open` builds a sink for an audio URL.
    pub fn new(open: F) -> Self {
        Self {
            sinks: HashMap::new(),
            open,
            current: None,
        }
    }

    /// Play item `id`, stopping anything else first.
    ///
    /// Returns `false` without side effects when the item has no audio.
    pub fn play(&mut self, id: &str, audio_url: Option<&str>) -> Result<bool, PlaybackError> {
        let Some(url) = audio_url.filter(|u| !u.is_empty()) else {
            return Ok(false);
        };

        self.stop_all();

        if !self.sinks.contains_key(id) {
            let sink = (self.open)(url)?;
            self.sinks.insert(id.to_string(), sink);
        }

        if let Some(sink) = self.sinks.get_mut(id) {
            sink.play()?;
            self.current = Some(id.to_string());
            tracing::debug!(id, "playback started");
        }

        Ok(true)
    }

    pub fn stop_all(&mut self) {
        for sink in self.sinks.values_mut() {
            sink.stop();
        }
        self.current = None;
    }

    /// Id of the item playing right now, if any.
    pub fn now_playing(&mut self) -> Option<&str> {
        let finished = match &self.current {
            Some(id) => !self.sinks.get_mut(id).is_some_and(|sink| sink.is_playing()),
            None => false,
        };
        if finished {
            self.current = None;
        }
        self.current.as_deref()
    }

    /// Sink cached for item `id`, once it has been played.
    pub fn sink(&self, id: &str) -> Option<&S> {
        self.sinks.get(id)
    }

    #[cfg(test)]
    pub(crate) fn cached(&self) -> usize {
        self.sinks.len()
    }
}

impl<S, F> Drop for PlaybackController<S, F>
where
    S: AudioSink,
    F: FnMut(&str) -> Result<S, PlaybackError>,
{
    fn drop(&mut self) {
        self.stop_all();
    }
}
