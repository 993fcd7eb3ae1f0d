use crate::assets::AssetHandle;

#[derive(Debug, Clone, PartialEq)]
pub struct Voice {
    pub asset: AssetHandle,
    pub volume: f32,
    pub pan: f32,
    pub looping: bool,
    pub paused: bool,
}

/// Mixer facade. Voices are tracked by the handle returned from `play`; the
/// real mixer drains this state once per frame.
pub struct AudioMixer {
    next_handle: u32,
    voices: Vec<(u32, Voice)>,
}

impl AudioMixer {
    pub fn new() -> Self {
        Self { next_handle: 1, voices: Vec::new() }
    }

    pub fn play(&mut self, asset: AssetHandle, volume: f32, pan: f32, looping: bool) -> u32 {
        let handle = self.next_handle;
        self.next_handle += 1;
        self.voices.push((handle, Voice { asset, volume, pan, looping, paused: false }));
        handle
    }

    pub fn stop(&mut self, handle: u32) {
        self.voices.retain(|(h, _)| *h != handle);
    }

    pub fn pause_resume(&mut self, handle: u32, pause: bool) {
        if let Some((_, voice)) = self.voices.iter_mut().find(|(h, _)| *h == handle) {
            voice.paused = pause;
        }
    }

    pub fn voice(&self, handle: u32) -> Option<&Voice> {
        self.voices.iter().find(|(h, _)| *h == handle).map(|(_, v)| v)
    }

    pub fn active_voices(&self) -> usize {
        self.voices.len()
    }
}

impl Default for AudioMixer {
    fn default() -> Self {
        Self::new()
    }
}
