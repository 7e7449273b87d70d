//! Test fixtures for integration tests
//!
//! Stands up a scratch directory with fake `sox`, `soxi`, `twolame`, ... shell
//! scripts so the orchestrator can be driven without real codecs. Probe
//! answers come from sidecar files next to each media file:
//!
//! - `<file>.soxi`   full `soxi` report, plus `#D`, `#c`, `#r`, `#B` single-field answers
//! - `<file>.file`   `file` description
//! - `<file>.mime`   `file --mime-type` answer
//! - `<file>.mp3val` `mp3val` output
//! - `<file>.dump`   sample dump written when the file is decoded to `.dat`
//!
//! Every tool appends its argument list to `bin/<tool>.log`.

use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::config::{Config, ProcessConfig, Tool};
use crate::orchestrator::Orchestrator;

const SOX: &str = r#"
dir=$(dirname "$0")
echo "$@" >> "$dir/sox.log"
for arg; do
  case "$arg" in
    *corrupt*)
      echo "sox FAIL formats: can't open input file: corrupt" >&2
      echo "sox error: corrupt input" >&2
      exit 2 ;;
  esac
done
for arg; do
  if [ "$arg" = "-" ]; then cat > /dev/null; break; fi
done
src=""
for arg; do
  case "$arg" in
    /*)
      if [ -s "$arg" ]; then
        [ -z "$src" ] && src="$arg"
      else
        case "$arg" in
          *.dat)
            if [ -f "$src.dump" ]; then cp "$src.dump" "$arg"; else echo "; Sample Rate 1000" > "$arg"; fi ;;
          *)
            printf 'RIFF----WAVEfmt ' > "$arg" ;;
        esac
      fi ;;
  esac
done
exit 0
"#;

const SOXI: &str = r#"
for f; do :; done
case "$2" in
  -D|-c|-r|-B)
    key=$(echo "$2" | cut -c2)
    grep "^#$key " "$f.soxi" | cut -c4- ;;
  *)
    grep -v '^#' "$f.soxi" ;;
esac
"#;

const FILE: &str = r#"
for f; do :; done
if [ "$1" = "--brief" ]; then
  if [ -f "$f.mime" ]; then cat "$f.mime"; else echo "application/octet-stream"; fi
else
  if [ -f "$f.file" ]; then printf '%s: ' "$f"; cat "$f.file"; else echo "$f: data"; fi
fi
"#;

const MP3VAL: &str = r#"
for f; do :; done
if [ -f "$f.mp3val" ]; then
  cat "$f.mp3val"
else
  echo "Analyzing file \"$f\"..."
  echo "Done!"
fi
"#;

/// Encoders: read stdin when told to, write the last argument
fn encoder_script(tool: &str) -> String {
    format!(
        r#"
dir=$(dirname "$0")
echo "$@" >> "$dir/{tool}.log"
for arg; do
  if [ "$arg" = "-" ]; then cat > /dev/null; break; fi
done
for out; do :; done
printf 'ENCODED' > "$out"
"#
    )
}

const MADPLAY: &str = r#"
dir=$(dirname "$0")
echo "$@" >> "$dir/madplay.log"
for arg; do
  case "$arg" in
    --output=wave:-) ;;
    --output=wave:*) printf 'RIFF----WAVEfmt ' > "${arg#--output=wave:}" ;;
  esac
done
"#;

const FLAC: &str = r#"
dir=$(dirname "$0")
echo "$@" >> "$dir/flac.log"
for arg; do
  case "$arg" in
    --output-name=*) printf 'RIFF----WAVEfmt ' > "${arg#--output-name=}" ;;
  esac
done
"#;

/// Scratch media directory plus fake tools
pub struct FakeToolbox {
    root: TempDir,
}

impl FakeToolbox {
    pub fn new() -> Self {
        let root = tempfile::tempdir().expect("create fixture dir");
        for dir in ["bin", "media", "tmp"] {
            std::fs::create_dir_all(root.path().join(dir)).expect("create fixture subdir");
        }
        let toolbox = Self { root };
        toolbox.install("sox", SOX);
        toolbox.install("soxi", SOXI);
        toolbox.install("file", FILE);
        toolbox.install("mp3val", MP3VAL);
        toolbox.install("twolame", &encoder_script("twolame"));
        toolbox.install("lame", &encoder_script("lame"));
        toolbox.install("ffmpeg", &encoder_script("ffmpeg"));
        toolbox.install("madplay", MADPLAY);
        toolbox.install("flac", FLAC);
        toolbox
    }

    pub fn bin_dir(&self) -> PathBuf {
        self.root.path().join("bin")
    }

    pub fn tmp_dir(&self) -> PathBuf {
        self.root.path().join("tmp")
    }

    /// Replace a tool with the given script body
    pub fn install(&self, tool: &str, body: &str) {
        let path = self.bin_dir().join(tool);
        std::fs::write(&path, format!("#!/bin/sh\n{}", body)).expect("write fake tool");
    }

    /// Config pointing every tool at its script; scripts run through `sh`
    /// so they never need to be executable
    pub fn config(&self) -> Config {
        let mut config = Config {
            tmp_dir: self.tmp_dir(),
            process: ProcessConfig {
                timeout_secs: 30,
                nice: 19,
                adjust_priority: false,
            },
            ..Default::default()
        };
        let script = |tool: Tool| format!("sh {}", self.bin_dir().join(tool.default_name()).display());
        config.tools.sox = script(Tool::Sox);
        config.tools.soxi = script(Tool::Soxi);
        config.tools.file = script(Tool::File);
        config.tools.mp3val = script(Tool::Mp3val);
        config.tools.twolame = script(Tool::Twolame);
        config.tools.lame = script(Tool::Lame);
        config.tools.ffmpeg = script(Tool::Ffmpeg);
        config.tools.madplay = script(Tool::Madplay);
        config.tools.flac = script(Tool::Flac);
        config
    }

    pub fn orchestrator(&self) -> Orchestrator {
        Orchestrator::new(self.config())
    }

    pub fn media_path(&self, name: &str) -> PathBuf {
        self.root.path().join("media").join(name)
    }

    /// Arguments every invocation of `tool` received, one line per run
    pub fn log(&self, tool: &str) -> String {
        std::fs::read_to_string(self.bin_dir().join(format!("{}.log", tool))).unwrap_or_default()
    }

    /// Files left behind in the scratch directory
    pub fn leftover_temp_files(&self) -> usize {
        std::fs::read_dir(self.tmp_dir())
            .map(|entries| entries.count())
            .unwrap_or(0)
    }

    pub fn set_sidecar(&self, media: &Path, suffix: &str, content: &str) {
        let mut path = media.as_os_str().to_os_string();
        path.push(suffix);
        std::fs::write(PathBuf::from(path), content).expect("write sidecar");
    }

    /// A 16-bit PCM wav with matching `soxi` answers
    pub fn add_wav(&self, name: &str, channels: u16, sample_rate: u32, duration_secs: f64) -> PathBuf {
        self.add_pcm(name, channels, sample_rate, duration_secs, "16-bit Signed Integer PCM", 16)
    }

    pub fn add_pcm(
        &self,
        name: &str,
        channels: u16,
        sample_rate: u32,
        duration_secs: f64,
        encoding: &str,
        precision: u16,
    ) -> PathBuf {
        let path = self.media_path(name);
        std::fs::write(&path, b"RIFF----WAVEfmt ").expect("write wav");
        self.set_sidecar(
            &path,
            ".soxi",
            &soxi_report(&path, channels, sample_rate, duration_secs, encoding, precision),
        );
        path
    }

    /// An MPEG file `file` describes as `description`
    pub fn add_mpeg(&self, name: &str, description: &str, duration_secs: f64) -> PathBuf {
        let path = self.media_path(name);
        std::fs::write(&path, b"\xff\xfdMPEG").expect("write mpeg");
        self.set_sidecar(&path, ".file", &format!("{}\n", description));
        self.set_sidecar(&path, ".soxi", &format!("#D {:.6}\n", duration_secs));
        path
    }
}

fn soxi_report(
    path: &Path,
    channels: u16,
    sample_rate: u32,
    duration_secs: f64,
    encoding: &str,
    precision: u16,
) -> String {
    let total_hundredths = (duration_secs * 100.0).round() as u64;
    let hours = total_hundredths / 360_000;
    let minutes = (total_hundredths / 6000) % 60;
    let seconds = (total_hundredths % 6000) as f64 / 100.0;
    let samples = (duration_secs * f64::from(sample_rate)).round() as u64;
    let bit_rate = f64::from(sample_rate) * f64::from(channels) * f64::from(precision) / 1_000_000.0;

    format!(
        "Input File     : '{path}'\n\
         Channels       : {channels}\n\
         Sample Rate    : {sample_rate}\n\
         Precision      : {precision}-bit\n\
         Duration       : {hours:02}:{minutes:02}:{seconds:05.2} = {samples} samples\n\
         Bit Rate       : {bit_rate:.2}M\n\
         Sample Encoding: {encoding}\n\
         #D {duration_secs:.6}\n\
         #c {channels}\n\
         #r {sample_rate}\n\
         #B {bit_rate:.2}M\n",
        path = path.display(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::SourceFormatInfo;

    #[test]
    fn test_soxi_report_parses() {
        let report = soxi_report(Path::new("/x.wav"), 2, 44100, 75.5, "16-bit Signed Integer PCM", 16);
        let info = SourceFormatInfo::parse(&report).unwrap();
        assert_eq!(info.channel_count, 2);
        assert_eq!(info.sample_rate, 44100);
        assert!((info.duration_secs - 75.5).abs() < 1e-6);
        assert!(report.contains("00:01:15.50"));
    }

    #[test]
    fn test_toolbox_layout() {
        let toolbox = FakeToolbox::new();
        assert!(toolbox.bin_dir().join("sox").is_file());
        assert!(toolbox.config().tools.sox.starts_with("sh "));
        assert_eq!(toolbox.leftover_temp_files(), 0);
    }
}
