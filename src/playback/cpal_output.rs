use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, Sample, SampleFormat, SizedSample};

use crate::error::BoxError;

use super::{Playback, Player, Requirement};

/// Plays in-process on the default output device.
///
/// Needs no external package; the dispatcher polls the stream until every
/// sample has been handed to the device.
#[derive(Debug, Clone, Copy, Default)]
pub struct CpalPlayer;

impl Player for CpalPlayer {
    fn requirements(&self) -> &[Requirement] {
        &[]
    }

    fn start(&self, path: &Path) -> Result<Box<dyn Playback>, BoxError> {
        let clip = Clip::read(path)?;

        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or("No audio output device available")?;

        // Prefer a config at the file's own rate, else take the device default.
        let config = device
            .supported_output_configs()?
            .filter(|c| c.channels() == 1 || c.channels() == 2)
            .find(|c| {
                c.min_sample_rate().0 <= clip.sample_rate && c.max_sample_rate().0 >= clip.sample_rate
            })
            .map(|c| c.with_sample_rate(cpal::SampleRate(clip.sample_rate)))
            .map_or_else(|| device.default_output_config(), Ok)?;

        let format = config.sample_format();
        let stream_config: cpal::StreamConfig = config.into();
        let finished = Arc::new(AtomicBool::new(false));
        let cursor = Cursor::new(clip, &stream_config);

        let stream = match format {
            SampleFormat::F32 => build_stream::<f32>(&device, &stream_config, cursor, &finished)?,
            SampleFormat::I16 => build_stream::<i16>(&device, &stream_config, cursor, &finished)?,
            SampleFormat::U16 => build_stream::<u16>(&device, &stream_config, cursor, &finished)?,
            other => return Err(format!("unsupported output sample format {other:?}").into()),
        };
        stream.play()?;

        Ok(Box::new(CpalPlayback {
            _stream: stream,
            finished,
        }))
    }
}

/// Decoded WAV samples, interleaved and normalized to [-1, 1].
struct Clip {
    samples: Vec<f32>,
    channels: usize,
    sample_rate: u32,
}

impl Clip {
    fn read(path: &Path) -> Result<Self, BoxError> {
        let mut reader = hound::WavReader::open(path)?;
        let spec = reader.spec();
        let samples = match spec.sample_format {
            hound::SampleFormat::Float => reader.samples::<f32>().collect::<Result<Vec<_>, _>>()?,
            hound::SampleFormat::Int => {
                let scale = (1i64 << (spec.bits_per_sample.max(1) - 1)) as f32;
                reader
                    .samples::<i32>()
                    .map(|s| s.map(|v| v as f32 / scale))
                    .collect::<Result<Vec<_>, _>>()?
            }
        };
        Ok(Self {
            samples,
            channels: spec.channels.max(1) as usize,
            sample_rate: spec.sample_rate,
        })
    }

    fn frames(&self) -> usize {
        self.samples.len() / self.channels
    }
}

/// Walks a clip frame by frame at the device rate (nearest-neighbour).
struct Cursor {
    clip: Clip,
    position: f64,
    step: f64,
    out_channels: usize,
}

impl Cursor {
    fn new(clip: Clip, config: &cpal::StreamConfig) -> Self {
        let step = clip.sample_rate as f64 / config.sample_rate.0.max(1) as f64;
        Self {
            clip,
            position: 0.0,
            step,
            out_channels: config.channels.max(1) as usize,
        }
    }

    /// Fill one interleaved output buffer; false once the clip is exhausted.
    fn fill(&mut self, out: &mut [f32]) -> bool {
        let mut playing = false;
        for frame in out.chunks_mut(self.out_channels) {
            let index = self.position as usize;
            if index >= self.clip.frames() {
                frame.fill(0.0);
                continue;
            }
            playing = true;
            let base = index * self.clip.channels;
            for (ch, slot) in frame.iter_mut().enumerate() {
                *slot = self.clip.samples[base + ch.min(self.clip.channels - 1)];
            }
            self.position += self.step;
        }
        playing
    }
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    mut cursor: Cursor,
    finished: &Arc<AtomicBool>,
) -> Result<cpal::Stream, BoxError>
where
    T: SizedSample + FromSample<f32>,
{
    let done = Arc::clone(finished);
    let mut scratch = Vec::new();

    let stream = device.build_output_stream(
        config,
        move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
            scratch.resize(data.len(), 0.0f32);
            let playing = cursor.fill(&mut scratch);
            for (dst, &src) in data.iter_mut().zip(scratch.iter()) {
                *dst = T::from_sample(src);
            }
            if !playing {
                done.store(true, Ordering::SeqCst);
            }
        },
        |err| log::error!("Audio playback error: {err}"),
        None,
    )?;
    Ok(stream)
}

struct CpalPlayback {
    _stream: cpal::Stream,
    finished: Arc<AtomicBool>,
}

impl Playback for CpalPlayback {
    fn is_busy(&mut self) -> Result<bool, BoxError> {
        Ok(!self.finished.load(Ordering::SeqCst))
    }
}
