use std::path::PathBuf;
use std::time::Instant;

use voicesynth::{
    engines::silero::{ModelHandle, Synthesizer},
    playback::{Backend, PlaybackDispatcher},
    SynthConfig,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let backend: Backend = args.next().as_deref().unwrap_or("ffplay").parse()?;
    let config = SynthConfig::builder().auto_provision(true).build()?;

    let model_path = PathBuf::from("models/v3_en.pt");
    let handle = ModelHandle::new("v3_en", &model_path, &config)?;

    let load_start = Instant::now();
    let mut synth = Synthesizer::new(handle, &config)?;
    println!("Model loaded in {:.2?}", load_start.elapsed());

    synth.set_speaker("en_21")?;

    let text = "Hello! This is a Silero voice, rendered a little faster than usual.";
    let out = PathBuf::from("output.wav");

    let synth_start = Instant::now();
    synth.render(text, &out, 120)?;
    println!("Synthesized in {:.2?}", synth_start.elapsed());

    let dispatcher = PlaybackDispatcher::new(config);
    dispatcher.play(&out, backend, true)?;
    println!("Played on {backend}");

    Ok(())
}
