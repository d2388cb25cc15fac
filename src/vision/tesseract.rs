//! Tesseract CLI backend
//!
//! Runs the locally installed `tesseract` binary in single-character page
//! segmentation mode on each candidate patch and reads the TSV report back.

use image::{imageops, GrayImage, ImageFormat, Luma};
use std::io::{self, ErrorKind, Read};
use std::process::{Child, Command, Output, Stdio};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use super::classifier::{CharClassifier, Classification};
use crate::config::ClassifierSettings;
use crate::error::ClassifierError;

const POLL_INTERVAL: Duration = Duration::from_millis(5);
/// TSV row level for a recognized word
const WORD_LEVEL: &str = "5";

/// Tesseract invocation settings
#[derive(Debug, Clone)]
pub struct TesseractConfig {
    /// Executable name or path
    pub command: String,
    /// Language pack (e.g., "eng")
    pub language: String,
    /// OCR engine mode (1 = LSTM only)
    pub oem: u32,
    /// Page segmentation mode (10 = single character)
    pub psm: u32,
    /// Resolution hint; patches carry no DPI metadata
    pub dpi: u32,
    /// White margin added around each patch
    pub border_px: u32,
    /// Per-call deadline
    pub timeout: Duration,
}

impl Default for TesseractConfig {
    fn default() -> Self {
        Self {
            command: "tesseract".to_string(),
            language: "eng".to_string(),
            oem: 1,
            psm: 10,
            dpi: 300,
            border_px: 8,
            timeout: Duration::from_millis(5000),
        }
    }
}

impl From<&ClassifierSettings> for TesseractConfig {
    fn from(settings: &ClassifierSettings) -> Self {
        Self {
            command: settings.command.clone(),
            language: settings.language.clone(),
            oem: settings.oem,
            psm: settings.psm,
            dpi: settings.dpi,
            border_px: settings.border_px,
            timeout: Duration::from_millis(settings.timeout_ms),
        }
    }
}

/// Single-character classifier backed by the tesseract executable
#[derive(Debug, Clone)]
pub struct TesseractClassifier {
    config: TesseractConfig,
}

impl TesseractClassifier {
    pub fn new(config: TesseractConfig) -> Self {
        info!(
            "Tesseract classifier: {} -l {} --oem {} --psm {} --dpi {} (timeout {:?})",
            config.command, config.language, config.oem, config.psm, config.dpi, config.timeout
        );
        Self { config }
    }

    /// First line of `tesseract --version`; doubles as an availability check
    pub fn version(&self) -> Result<String, ClassifierError> {
        let child = self.spawn(Command::new(&self.config.command).arg("--version"))?;
        let output = wait_with_deadline(child, self.config.timeout)?;

        // Older releases print the banner on stderr.
        let text = if output.stdout.is_empty() {
            String::from_utf8_lossy(&output.stderr).to_string()
        } else {
            String::from_utf8_lossy(&output.stdout).to_string()
        };
        Ok(text.lines().next().unwrap_or_default().trim().to_string())
    }

    fn spawn(&self, command: &mut Command) -> Result<Child, ClassifierError> {
        command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound | ErrorKind::PermissionDenied => {
                    ClassifierError::Unavailable(format!("{}: {}", self.config.command, e))
                }
                _ => ClassifierError::Io(e),
            })
    }
}

impl CharClassifier for TesseractClassifier {
    fn classify(&self, patch: &GrayImage) -> Result<Classification, ClassifierError> {
        let file = tempfile::Builder::new()
            .prefix("letterseg-")
            .suffix(".png")
            .tempfile()?;

        add_border(patch, self.config.border_px)
            .save_with_format(file.path(), ImageFormat::Png)
            .map_err(|e| ClassifierError::Engine(format!("failed to write patch: {}", e)))?;

        let child = self.spawn(
            Command::new(&self.config.command)
                .arg(file.path())
                .arg("stdout")
                .arg("-l")
                .arg(&self.config.language)
                .arg("--oem")
                .arg(self.config.oem.to_string())
                .arg("--psm")
                .arg(self.config.psm.to_string())
                .arg("--dpi")
                .arg(self.config.dpi.to_string())
                .arg("tsv"),
        )?;
        let output = wait_with_deadline(child, self.config.timeout)?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ClassifierError::Engine(stderr.trim().to_string()));
        }

        let result = parse_tsv(&String::from_utf8_lossy(&output.stdout));
        debug!("tesseract read {:?} ({:.3})", result.text, result.confidence);
        Ok(result)
    }
}

/// Wait for `child`, killing it once `timeout` has passed
///
/// Both pipes are drained on their own threads while waiting, otherwise a
/// child that fills a pipe buffer blocks forever and looks like a timeout.
fn wait_with_deadline(mut child: Child, timeout: Duration) -> Result<Output, ClassifierError> {
    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());
    let deadline = Instant::now() + timeout;

    let status = loop {
        if let Some(status) = child.try_wait()? {
            break status;
        }
        if Instant::now() >= deadline {
            let _ = child.kill();
            let _ = child.wait();
            // Readers are left detached: a grandchild may still hold the pipes.
            return Err(ClassifierError::Timeout(timeout.as_millis() as u64));
        }
        std::thread::sleep(POLL_INTERVAL);
    };

    Ok(Output {
        status,
        stdout: join_drain(stdout)?,
        stderr: join_drain(stderr)?,
    })
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> JoinHandle<io::Result<Vec<u8>>> {
    std::thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            pipe.read_to_end(&mut buf)?;
        }
        Ok(buf)
    })
}

fn join_drain(handle: JoinHandle<io::Result<Vec<u8>>>) -> Result<Vec<u8>, ClassifierError> {
    handle
        .join()
        .map_err(|_| ClassifierError::Engine("pipe reader panicked".to_string()))?
        .map_err(ClassifierError::from)
}

/// Surround the patch with white so glyphs don't touch the image edge
fn add_border(patch: &GrayImage, border_px: u32) -> GrayImage {
    if border_px == 0 {
        return patch.clone();
    }
    let mut canvas = GrayImage::from_pixel(
        patch.width() + 2 * border_px,
        patch.height() + 2 * border_px,
        Luma([255]),
    );
    imageops::replace(&mut canvas, patch, border_px as i64, border_px as i64);
    canvas
}

/// Pick the most confident word row of a tesseract TSV report
///
/// Confidence is reported as 0-100, with -1 for rows without a reading.
fn parse_tsv(tsv: &str) -> Classification {
    let mut best: Option<Classification> = None;

    for line in tsv.lines().skip(1) {
        let columns: Vec<&str> = line.split('\t').collect();
        if columns.len() < 12 || columns[0] != WORD_LEVEL {
            continue;
        }
        let text = columns[11].trim();
        if text.is_empty() {
            continue;
        }
        let confidence = columns[10]
            .trim()
            .parse::<f32>()
            .map(|c| (c / 100.0).clamp(0.0, 1.0))
            .unwrap_or(0.0);

        if best.as_ref().map_or(true, |b| confidence > b.confidence) {
            best = Some(Classification::new(text, confidence));
        }
    }

    best.unwrap_or_else(|| Classification::new("", 0.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str =
        "level\tpage_num\tblock_num\tpar_num\tline_num\tword_num\tleft\ttop\twidth\theight\tconf\ttext";

    #[test]
    fn test_parse_single_character() {
        let tsv = format!(
            "{}\n1\t1\t0\t0\t0\t0\t0\t0\t36\t36\t-1\t\n5\t1\t1\t1\t1\t1\t8\t8\t20\t20\t91.5\tA\n",
            HEADER
        );

        let result = parse_tsv(&tsv);
        assert_eq!(result.text, "A");
        assert!((result.confidence - 0.915).abs() < 1e-4);
    }

    #[test]
    fn test_parse_prefers_most_confident_row() {
        let tsv = format!(
            "{}\n5\t1\t1\t1\t1\t1\t0\t0\t5\t5\t40\tr\n5\t1\t1\t1\t1\t2\t5\t0\t5\t5\t72\tn\n",
            HEADER
        );

        let result = parse_tsv(&tsv);
        assert_eq!(result.text, "n");
    }

    #[test]
    fn test_parse_empty_report() {
        let result = parse_tsv(HEADER);
        assert_eq!(result, Classification::new("", 0.0));
    }

    #[test]
    fn test_parse_negative_confidence() {
        let tsv = format!("{}\n5\t1\t1\t1\t1\t1\t0\t0\t5\t5\t-1\tx\n", HEADER);
        assert_eq!(parse_tsv(&tsv), Classification::new("x", 0.0));
    }

    #[test]
    fn test_add_border() {
        let patch = GrayImage::from_pixel(4, 6, Luma([0]));
        let padded = add_border(&patch, 3);

        assert_eq!(padded.dimensions(), (10, 12));
        assert_eq!(padded.get_pixel(0, 0), &Luma([255]));
        assert_eq!(padded.get_pixel(3, 3), &Luma([0]));
        assert_eq!(padded.get_pixel(6, 8), &Luma([0]));
        assert_eq!(padded.get_pixel(7, 9), &Luma([255]));
    }

    #[test]
    fn test_missing_executable_is_unavailable() {
        let classifier = TesseractClassifier::new(TesseractConfig {
            command: "letterseg-no-such-ocr-engine".to_string(),
            ..Default::default()
        });

        let result = classifier.classify(&GrayImage::new(10, 10));
        assert!(matches!(result, Err(ClassifierError::Unavailable(_))));
    }

    #[test]
    fn test_config_from_settings() {
        let settings = ClassifierSettings {
            timeout_ms: 250,
            psm: 8,
            ..Default::default()
        };

        let config = TesseractConfig::from(&settings);
        assert_eq!(config.timeout, Duration::from_millis(250));
        assert_eq!(config.psm, 8);
        assert_eq!(config.dpi, 300);
        assert_eq!(config.command, "tesseract");
    }

    /// Classifier whose engine is a shell script that ignores its arguments
    #[cfg(unix)]
    fn scripted(dir: &std::path::Path, body: &str, timeout: Duration) -> TesseractClassifier {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join("fake-tesseract");
        std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();

        TesseractClassifier::new(TesseractConfig {
            command: path.to_string_lossy().to_string(),
            timeout,
            ..Default::default()
        })
    }

    #[cfg(unix)]
    #[test]
    fn test_large_stderr_does_not_block() {
        let dir = tempfile::tempdir().unwrap();
        // Well past a 64 KiB pipe buffer before the report is printed
        let body = "head -c 200000 /dev/zero | tr '\\0' x >&2\n\
                    printf 'level\\tpage_num\\tblock_num\\tpar_num\\tline_num\\tword_num\\tleft\\ttop\\twidth\\theight\\tconf\\ttext\\n'\n\
                    printf '5\\t1\\t1\\t1\\t1\\t1\\t0\\t0\\t5\\t5\\t90\\tA\\n'";
        let classifier = scripted(dir.path(), body, Duration::from_secs(10));

        let result = classifier.classify(&GrayImage::new(10, 10)).unwrap();
        assert_eq!(result.text, "A");
        assert!((result.confidence - 0.9).abs() < 1e-4);
    }

    #[cfg(unix)]
    #[test]
    fn test_slow_engine_times_out() {
        let dir = tempfile::tempdir().unwrap();
        let classifier = scripted(dir.path(), "sleep 5", Duration::from_millis(200));

        let started = Instant::now();
        let result = classifier.classify(&GrayImage::new(10, 10));

        assert!(matches!(result, Err(ClassifierError::Timeout(200))));
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[cfg(unix)]
    #[test]
    fn test_failing_engine_reports_stderr() {
        let dir = tempfile::tempdir().unwrap();
        let classifier = scripted(
            dir.path(),
            "echo 'Error opening data file' >&2\nexit 3",
            Duration::from_secs(10),
        );

        match classifier.classify(&GrayImage::new(10, 10)) {
            Err(ClassifierError::Engine(message)) => {
                assert_eq!(message, "Error opening data file")
            }
            other => panic!("expected engine error, got {:?}", other),
        }
    }
}
