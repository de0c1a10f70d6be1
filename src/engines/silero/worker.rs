use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

use serde::{Deserialize, Serialize};

use crate::error::{BoxError, Result, VoiceSynthError};
use crate::AcousticModel;

/// Loads a Silero `torch.package` once, then serves one JSON request per line.
const WORKER_SCRIPT: &str = r#"
import json, sys
import torch

torch.set_num_threads(int(sys.argv[2]))
model = torch.package.PackageImporter(sys.argv[1]).load_pickle("tts_models", "model")
model.to(torch.device("cpu"))
print(json.dumps({"ok": True}), flush=True)

for line in sys.stdin:
    req = json.loads(line)
    try:
        model.save_wav(ssml_text=req["ssml"], speaker=req["speaker"],
                       sample_rate=req["sample_rate"], audio_path=req["audio_path"])
        print(json.dumps({"ok": True}), flush=True)
    except Exception as e:
        print(json.dumps({"ok": False, "error": repr(e)}), flush=True)
"#;

/// Parameters for loading a model package.
#[derive(Debug, Clone)]
pub struct TorchModelParams {
    /// Interpreter with `torch` importable.
    pub python: PathBuf,
    /// Threads handed to `torch.set_num_threads`.
    pub num_threads: usize,
}

#[derive(Debug, Serialize)]
struct RenderRequest<'a> {
    ssml: &'a str,
    speaker: &'a str,
    sample_rate: u32,
    audio_path: &'a Path,
}

#[derive(Debug, Deserialize)]
struct WorkerReply {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

/// A Silero model package hosted by a long-lived Python/torch process.
///
/// The package is loaded once when the worker starts; each render is a
/// round trip over the worker's stdin/stdout. Dropping the model stops the
/// worker.
pub struct TorchPackageModel {
    child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
}

impl TorchPackageModel {
    /// Start a worker and block until it has loaded the package at `model_path`.
    pub fn load(model_path: &Path, params: &TorchModelParams) -> Result<Self> {
        let load_error = |reason: String| VoiceSynthError::ModelLoad {
            path: model_path.to_path_buf(),
            reason,
        };

        log::debug!(
            "Loading model package {} with {} ({} threads)",
            model_path.display(),
            params.python.display(),
            params.num_threads
        );

        let mut child = Command::new(&params.python)
            .arg("-c")
            .arg(WORKER_SCRIPT)
            .arg(model_path)
            .arg(params.num_threads.to_string())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    load_error(format!(
                        "interpreter '{}' not found; install Python with torch or set SynthConfig::python",
                        params.python.display()
                    ))
                } else {
                    VoiceSynthError::Io(e)
                }
            })?;

        let (Some(stdin), Some(stdout)) = (child.stdin.take(), child.stdout.take()) else {
            let _ = child.kill();
            return Err(load_error("worker pipes unavailable".to_string()));
        };

        let mut model = Self {
            child,
            stdin,
            stdout: BufReader::new(stdout),
        };

        match model.read_reply() {
            Ok(reply) if reply.ok => {
                log::debug!("Model package loaded");
                Ok(model)
            }
            Ok(reply) => Err(load_error(reply.error.unwrap_or_default())),
            Err(e) => Err(load_error(e.to_string())),
        }
    }

    /// Next reply line; anything the model itself prints is skipped.
    fn read_reply(&mut self) -> std::result::Result<WorkerReply, BoxError> {
        let mut line = String::new();
        loop {
            line.clear();
            if self.stdout.read_line(&mut line)? == 0 {
                let status = self.child.wait()?;
                return Err(format!("worker exited unexpectedly ({status})").into());
            }
            let trimmed = line.trim();
            if trimmed.starts_with('{') {
                return Ok(serde_json::from_str(trimmed)?);
            }
            log::debug!("worker: {trimmed}");
        }
    }

    fn send<T: Serialize>(&mut self, request: &T) -> std::io::Result<()> {
        let mut payload = serde_json::to_vec(request)?;
        payload.push(b'\n');
        self.stdin.write_all(&payload)?;
        self.stdin.flush()
    }
}

impl AcousticModel for TorchPackageModel {
    fn render_to_file(
        &mut self,
        markup: &str,
        speaker: &str,
        sample_rate: u32,
        output_path: &Path,
    ) -> std::result::Result<(), BoxError> {
        self.send(&RenderRequest {
            ssml: markup,
            speaker,
            sample_rate,
            audio_path: output_path,
        })?;

        let reply = self.read_reply()?;
        if reply.ok {
            Ok(())
        } else {
            Err(reply
                .error
                .unwrap_or_else(|| "worker reported failure".to_string())
                .into())
        }
    }
}

impl Drop for TorchPackageModel {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}
