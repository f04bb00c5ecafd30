//! Pull-based upstream sample sources

/// One stereo frame; analysis only looks at channel 0
pub type Frame = [f32; 2];

/// Something that can be pulled from for sample frames, such as a live
/// input device or a test fixture.
pub trait SampleSource {
    /// Fill up to `frames.len()` frames.
    ///
    /// Returns the number of frames written and whether more data may
    /// follow. Once `false` is returned the source is exhausted (or failed,
    /// or was cancelled) and the written count should be ignored.
    fn read(&mut self, frames: &mut [Frame]) -> (usize, bool);
}

impl<S: SampleSource + ?Sized> SampleSource for &mut S {
    fn read(&mut self, frames: &mut [Frame]) -> (usize, bool) {
        (**self).read(frames)
    }
}

impl<S: SampleSource + ?Sized> SampleSource for Box<S> {
    fn read(&mut self, frames: &mut [Frame]) -> (usize, bool) {
        (**self).read(frames)
    }
}

/// In-memory mono source that plays a fixed sample vector once
#[derive(Debug, Clone, Default)]
pub struct VecSource {
    samples: Vec<f32>,
    position: usize,
}

impl VecSource {
    pub fn new(samples: Vec<f32>) -> Self {
        Self {
            samples,
            position: 0,
        }
    }

    /// Samples not yet read
    pub fn remaining(&self) -> usize {
        self.samples.len() - self.position
    }
}

impl SampleSource for VecSource {
    fn read(&mut self, frames: &mut [Frame]) -> (usize, bool) {
        if self.remaining() == 0 {
            return (0, false);
        }

        let count = frames.len().min(self.remaining());
        let chunk = &self.samples[self.position..self.position + count];
        for (frame, &sample) in frames.iter_mut().zip(chunk) {
            *frame = [sample, sample];
        }
        self.position += count;
        (count, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec_source_drains_then_ends() {
        let mut source = VecSource::new(vec![1.0, 2.0, 3.0]);
        let mut frames = [[0.0; 2]; 2];

        assert_eq!(source.read(&mut frames), (2, true));
        assert_eq!(frames, [[1.0, 1.0], [2.0, 2.0]]);

        assert_eq!(source.read(&mut frames), (1, true));
        assert_eq!(frames[0], [3.0, 3.0]);

        assert_eq!(source.read(&mut frames), (0, false));
    }

    #[test]
    fn test_boxed_source() {
        let mut source: Box<dyn SampleSource> = Box::new(VecSource::new(vec![0.5]));
        let mut frames = [[0.0; 2]; 4];
        assert_eq!(source.read(&mut frames), (1, true));
        assert_eq!(source.read(&mut frames), (0, false));
    }
}
