//! Transcription adapter: uploaded bytes in, one transcript string out.
//!
//! # Flow
//!
//! ```text
//! bytes ──▶ scratch file (unique name in scratch_dir)
//!             └─▶ AudioDecoder::decode   → 16 kHz mono f32
//!                   └─▶ SttEngine::transcribe → segments
//!                         └─▶ concatenate in order, trim
//! ```
//!
//! The scratch file is a `tempfile::NamedTempFile` owned by the blocking
//! worker, so it is removed on every exit path: success, decoder or engine
//! error, and panics inside the worker.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::NamedTempFile;

use crate::config::SttConfig;
use crate::stt::decode::{AudioDecoder, FfmpegDecoder};
use crate::stt::engine::{SttEngine, SttError};
use crate::stt::transcribe::TranscriptionResult;

const SCRATCH_PREFIX: &str = "upload-";

/// Runs uploads through a decoder and an [`SttEngine`].
#[derive(Clone)]
pub struct TranscriptionAdapter {
    engine: Arc<dyn SttEngine>,
    decoder: Arc<dyn AudioDecoder>,
    scratch_dir: PathBuf,
}

impl std::fmt::Debug for TranscriptionAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TranscriptionAdapter")
            .field("scratch_dir", &self.scratch_dir)
            .finish_non_exhaustive()
    }
}

impl TranscriptionAdapter {
    pub fn new(
        engine: Arc<dyn SttEngine>,
        decoder: Arc<dyn AudioDecoder>,
        scratch_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            engine,
            decoder,
            scratch_dir: scratch_dir.into(),
        }
    }

    /// Adapter using ffmpeg and the scratch directory from `config`.
    pub fn from_config(engine: Arc<dyn SttEngine>, config: &SttConfig) -> Self {
        Self::new(
            engine,
            Arc::new(FfmpegDecoder::new(config.ffmpeg_bin.clone())),
            config.scratch_dir(),
        )
    }

    /// Transcribe one uploaded audio file.
    ///
    /// `file_name` is only used to keep the upload's extension on the
    /// scratch file, which helps ffmpeg pick a demuxer.
    pub async fn transcribe<B>(
        &self,
        audio: B,
        file_name: Option<&str>,
    ) -> Result<TranscriptionResult, SttError>
    where
        B: AsRef<[u8]> + Send + 'static,
    {
        let engine = Arc::clone(&self.engine);
        let decoder = Arc::clone(&self.decoder);
        let scratch_dir = self.scratch_dir.clone();
        let suffix = scratch_suffix(file_name);

        tokio::task::spawn_blocking(move || {
            let scratch = write_scratch(&scratch_dir, &suffix, audio.as_ref())?;
            log::debug!(
                "scratch file {} ({} bytes)",
                scratch.path().display(),
                audio.as_ref().len()
            );

            let samples = decoder.decode(scratch.path())?;
            if samples.is_empty() {
                return Err(SttError::EmptyAudio);
            }
            let transcript = engine.transcribe(&samples)?;

            let path = scratch.path().to_path_buf();
            if let Err(e) = scratch.close() {
                log::warn!("failed to remove scratch file {}: {e}", path.display());
            }

            Ok(TranscriptionResult::from(transcript))
        })
        .await
        .map_err(|e| SttError::Internal(format!("transcription worker failed: {e}")))?
    }
}

fn write_scratch(dir: &Path, suffix: &str, bytes: &[u8]) -> Result<NamedTempFile, SttError> {
    let mut file = tempfile::Builder::new()
        .prefix(SCRATCH_PREFIX)
        .suffix(suffix)
        .tempfile_in(dir)
        .map_err(|e| {
            SttError::Scratch(format!("failed to create file in {}: {e}", dir.display()))
        })?;

    file.write_all(bytes)
        .and_then(|()| file.flush())
        .map_err(|e| SttError::Scratch(format!("failed to write upload: {e}")))?;

    Ok(file)
}

/// `.ext` from the client file name, restricted to a short alphanumeric
/// extension; anything else gets no suffix.
fn scratch_suffix(file_name: Option<&str>) -> String {
    file_name
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.len() <= 8)
        .filter(|ext| ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::Mutex;

    use crate::stt::engine::MockSttEngine;

    /// Reads the scratch file as raw f32le PCM and records every path it saw.
    #[derive(Default)]
    pub(crate) struct RawPcmDecoder {
        pub(crate) seen: Mutex<Vec<PathBuf>>,
    }

    impl AudioDecoder for RawPcmDecoder {
        fn decode(&self, path: &Path) -> Result<Vec<f32>, SttError> {
            assert!(path.exists(), "scratch file must exist while decoding");
            self.seen.lock().unwrap().push(path.to_path_buf());
            let bytes = std::fs::read(path).map_err(|e| SttError::Decode(e.to_string()))?;
            crate::stt::decode::pcm_f32le_to_samples(&bytes)
        }
    }

    struct PanickingDecoder;

    impl AudioDecoder for PanickingDecoder {
        fn decode(&self, _path: &Path) -> Result<Vec<f32>, SttError> {
            panic!("decoder blew up");
        }
    }

    /// Decodes, then deletes the scratch file out from under the adapter.
    struct DeletingDecoder;

    impl AudioDecoder for DeletingDecoder {
        fn decode(&self, path: &Path) -> Result<Vec<f32>, SttError> {
            let samples = RawPcmDecoder::default().decode(path)?;
            std::fs::remove_file(path).map_err(|e| SttError::Decode(e.to_string()))?;
            Ok(samples)
        }
    }

    pub(crate) fn pcm_bytes(samples: usize) -> Vec<u8> {
        vec![0.1f32; samples]
            .iter()
            .flat_map(|s| s.to_le_bytes())
            .collect()
    }

    fn dir_is_empty(dir: &Path) -> bool {
        std::fs::read_dir(dir).unwrap().next().is_none()
    }

    #[tokio::test]
    async fn concatenates_segments_and_removes_scratch() {
        let dir = tempfile::tempdir().unwrap();
        let decoder = Arc::new(RawPcmDecoder::default());
        let adapter = TranscriptionAdapter::new(
            Arc::new(MockSttEngine::segments(&[" Hello", " world. "])),
            decoder.clone(),
            dir.path(),
        );

        let result = adapter
            .transcribe(pcm_bytes(1_600), Some("clip.webm"))
            .await
            .unwrap();

        assert_eq!(result.text, "Hello world.");
        assert_eq!(result.segment_count, 2);

        let seen = decoder.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert!(seen[0].starts_with(dir.path()));
        assert_eq!(seen[0].extension().unwrap(), "webm");
        assert!(dir_is_empty(dir.path()));
    }

    #[tokio::test]
    async fn engine_error_still_removes_scratch() {
        let dir = tempfile::tempdir().unwrap();
        let adapter = TranscriptionAdapter::new(
            Arc::new(MockSttEngine::err(SttError::Transcription("model exploded".into()))),
            Arc::new(RawPcmDecoder::default()),
            dir.path(),
        );

        let err = adapter.transcribe(pcm_bytes(160), None).await.unwrap_err();
        assert!(matches!(err, SttError::Transcription(_)));
        assert!(dir_is_empty(dir.path()));
    }

    #[tokio::test]
    async fn decode_error_still_removes_scratch() {
        let dir = tempfile::tempdir().unwrap();
        let adapter = TranscriptionAdapter::new(
            Arc::new(MockSttEngine::segments(&["unused"])),
            Arc::new(RawPcmDecoder::default()),
            dir.path(),
        );

        // 7 bytes is not whole f32 samples.
        let err = adapter.transcribe(vec![0u8; 7], None).await.unwrap_err();
        assert!(matches!(err, SttError::Decode(_)));
        assert!(dir_is_empty(dir.path()));
    }

    #[tokio::test]
    async fn panic_in_worker_still_removes_scratch() {
        let dir = tempfile::tempdir().unwrap();
        let adapter = TranscriptionAdapter::new(
            Arc::new(MockSttEngine::segments(&["unused"])),
            Arc::new(PanickingDecoder),
            dir.path(),
        );

        let err = adapter.transcribe(pcm_bytes(16), None).await.unwrap_err();
        assert!(matches!(err, SttError::Internal(_)));
        assert!(dir_is_empty(dir.path()));
    }

    #[tokio::test]
    async fn empty_decode_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let adapter = TranscriptionAdapter::new(
            Arc::new(MockSttEngine::segments(&["unused"])),
            Arc::new(RawPcmDecoder::default()),
            dir.path(),
        );

        let err = adapter.transcribe(Vec::new(), None).await.unwrap_err();
        assert!(matches!(err, SttError::EmptyAudio));
        assert!(dir_is_empty(dir.path()));
    }

    #[tokio::test]
    async fn concurrent_uploads_use_distinct_scratch_files() {
        let dir = tempfile::tempdir().unwrap();
        let decoder = Arc::new(RawPcmDecoder::default());
        let adapter = TranscriptionAdapter::new(
            Arc::new(MockSttEngine::segments(&["hi"])),
            decoder.clone(),
            dir.path(),
        );

        let (a, b) = tokio::join!(
            adapter.transcribe(pcm_bytes(160), Some("a.wav")),
            adapter.transcribe(pcm_bytes(160), Some("b.wav")),
        );
        a.unwrap();
        b.unwrap();

        let seen = decoder.seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_ne!(seen[0], seen[1]);
        assert!(dir_is_empty(dir.path()));
    }

    #[tokio::test]
    async fn failed_scratch_cleanup_keeps_transcript() {
        let dir = tempfile::tempdir().unwrap();
        let adapter = TranscriptionAdapter::new(
            Arc::new(MockSttEngine::segments(&[" still", " here"])),
            Arc::new(DeletingDecoder),
            dir.path(),
        );

        let result = adapter.transcribe(pcm_bytes(160), None).await.unwrap();
        assert_eq!(result.text, "still here");
        assert!(dir_is_empty(dir.path()));
    }

    #[tokio::test]
    async fn missing_scratch_dir_is_scratch_error() {
        let adapter = TranscriptionAdapter::new(
            Arc::new(MockSttEngine::segments(&["hi"])),
            Arc::new(RawPcmDecoder::default()),
            "/nonexistent/scratch/dir",
        );

        let err = adapter.transcribe(pcm_bytes(16), None).await.unwrap_err();
        assert!(matches!(err, SttError::Scratch(_)));
    }

    #[test]
    fn scratch_suffix_keeps_simple_extensions_only() {
        assert_eq!(scratch_suffix(Some("voice.WAV")), ".wav");
        assert_eq!(scratch_suffix(Some("recording.webm")), ".webm");
        assert_eq!(scratch_suffix(Some("no_extension")), "");
        assert_eq!(scratch_suffix(Some("evil.wav;rm -rf")), "");
        assert_eq!(scratch_suffix(Some("../../etc/passwd")), "");
        assert_eq!(scratch_suffix(None), "");
    }
}
