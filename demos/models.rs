use std::path::PathBuf;

use voicesynth::engines::silero::Catalog;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let catalog = match std::env::args().nth(1) {
        Some(path) => Catalog::from_json_file(&PathBuf::from(path))?,
        None => Catalog::builtin().clone(),
    };
    print!("{catalog}");
    Ok(())
}
