//! Video file downloading.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::StreamExt;
use indicatif::{MultiProgress, ProgressBar};
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;

use crate::archive::{ArchiveFetcher, StreamedBody};
use crate::config::ExistingFileMode;
use crate::error::{Error, Result};
use crate::fs::naming::{extension_for_content_type, sanitize_filename};
use crate::media::VideoRecord;
use crate::output::create_download_bar;

/// Minimum file size to show progress bar (20 MB).
const PROGRESS_THRESHOLD: u64 = 20 * 1024 * 1024;

/// Result of a download attempt that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    /// The file was fetched and written.
    Downloaded { path: PathBuf, bytes: u64 },
    /// The file was already present and left untouched.
    AlreadyExists(PathBuf),
}

/// Streams video files into an account folder.
pub struct Downloader {
    fetcher: Arc<dyn ArchiveFetcher>,
    target_dir: PathBuf,
    existing_files: ExistingFileMode,
    /// Bars for large files are drawn here, below the run's own bars.
    progress: Option<MultiProgress>,
}

impl Downloader {
    pub fn new(
        fetcher: Arc<dyn ArchiveFetcher>,
        target_dir: PathBuf,
        existing_files: ExistingFileMode,
        progress: Option<MultiProgress>,
    ) -> Self {
        Self {
            fetcher,
            target_dir,
            existing_files,
            progress,
        }
    }

    /// Download a record's video file.
    ///
    /// The record's filename is a guess made from the video URL; the final
    /// extension follows the response Content-Type when it names another video
    /// type. With [`ExistingFileMode::Skip`] a file with the same stem and any
    /// extension counts as present and is never re-fetched. Bytes go to a
    /// temporary `.part` file that is renamed into place once the stream
    /// completes.
    pub async fn download(&self, record: &VideoRecord) -> Result<DownloadOutcome> {
        let (stem, guessed_ext) = record
            .filename
            .rsplit_once('.')
            .unwrap_or((record.filename.as_str(), ""));

        let existing = self.find_existing(stem).await?;
        if let Some(path) = &existing {
            if self.existing_files == ExistingFileMode::Skip {
                tracing::debug!("Skipping existing file: {}", path.display());
                return Ok(DownloadOutcome::AlreadyExists(path.clone()));
            }
        }

        let body = self.fetcher.fetch_stream(&record.video_url).await?;

        if let Some(content_type) = &body.content_type {
            if content_type.starts_with("text/html") {
                return Err(Error::Download(format!(
                    "Expected a video but the archive returned a page for {}",
                    record.video_url
                )));
            }
        }

        let filename = match body
            .content_type
            .as_deref()
            .and_then(|ct| extension_for_content_type(ct, guessed_ext))
        {
            Some(ext) if ext != guessed_ext => sanitize_filename(&format!("{}.{}", stem, ext))?,
            _ => record.filename.clone(),
        };
        let output_path = self.target_dir.join(&filename);

        fs::create_dir_all(&self.target_dir).await?;

        let part_path = self
            .target_dir
            .join(format!(".{}.{}.part", filename, uuid::Uuid::new_v4()));

        let bytes = match self.write_body(body, &record.video_url, &part_path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                let _ = fs::remove_file(&part_path).await;
                return Err(e);
            }
        };

        if let Some(old) = existing.filter(|old| *old != output_path) {
            tracing::debug!("Replacing {}", old.display());
            fs::remove_file(&old).await?;
        }
        if output_path.exists() {
            fs::remove_file(&output_path).await?;
        }
        fs::rename(&part_path, &output_path).await?;

        Ok(DownloadOutcome::Downloaded {
            path: output_path,
            bytes,
        })
    }

    /// A finished file in the target folder named `{stem}.{ext}`.
    async fn find_existing(&self, stem: &str) -> Result<Option<PathBuf>> {
        let mut entries = match fs::read_dir(&self.target_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            if matches!(name.rsplit_once('.'), Some((s, ext)) if s == stem && ext != "part") {
                return Ok(Some(entry.path()));
            }
        }

        Ok(None)
    }

    /// Byte progress bar for a file of `content_length` bytes, if one is shown.
    fn download_bar(&self, content_length: Option<u64>) -> Option<ProgressBar> {
        let progress = self.progress.as_ref()?;
        match content_length {
            Some(len) if len > PROGRESS_THRESHOLD => Some(progress.add(create_download_bar(len))),
            _ => None,
        }
    }

    async fn write_body(&self, body: StreamedBody, url: &str, path: &Path) -> Result<u64> {
        let progress = self.download_bar(body.content_length);

        let mut file = File::create(path).await?;
        let mut stream = body.stream;
        let mut downloaded: u64 = 0;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await?;
            downloaded += chunk.len() as u64;

            if let Some(ref pb) = progress {
                pb.set_position(downloaded);
            }
        }

        file.flush().await?;

        if let Some(pb) = progress {
            pb.finish_and_clear();
            if let Some(multi) = &self.progress {
                multi.remove(&pb);
            }
        }

        if downloaded == 0 {
            return Err(Error::Download(format!("Empty response body for {}", url)));
        }

        Ok(downloaded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::fetcher::testing::MemoryArchive;
    use crate::media::VideoPage;

    const VIDEO_URL: &str = "https://web.archive.org/web/2019id_/https://cdn.example/720.mp4";

    fn record() -> VideoRecord {
        VideoRecord {
            page: VideoPage {
                url: "https://plays.tv/video/aaa/clip".to_string(),
                fetch_url: String::new(),
                timestamp: None,
                id: "aaa".to_string(),
                slug: Some("clip".to_string()),
            },
            video_url: VIDEO_URL.to_string(),
            filename: "clip_aaa.mp4".to_string(),
        }
    }

    fn downloader(archive: Arc<MemoryArchive>, dir: &Path, mode: ExistingFileMode) -> Downloader {
        Downloader::new(archive, dir.to_path_buf(), mode, None)
    }

    #[tokio::test]
    async fn test_downloads_file() {
        let dir = tempfile::tempdir().unwrap();
        let archive = Arc::new(MemoryArchive::new().file(VIDEO_URL, b"0123456789"));
        let target = dir.path().join("gamer");

        let outcome = downloader(archive, &target, ExistingFileMode::Skip)
            .download(&record())
            .await
            .unwrap();

        let path = target.join("clip_aaa.mp4");
        assert_eq!(
            outcome,
            DownloadOutcome::Downloaded {
                path: path.clone(),
                bytes: 10
            }
        );
        assert_eq!(std::fs::read(&path).unwrap(), b"0123456789");

        let leftovers: Vec<_> = std::fs::read_dir(&target)
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".part"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[tokio::test]
    async fn test_existing_file_is_not_refetched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip_aaa.mp4");
        std::fs::write(&path, b"old").unwrap();

        let archive = Arc::new(MemoryArchive::new().file(VIDEO_URL, b"new bytes"));
        let outcome = downloader(archive.clone(), dir.path(), ExistingFileMode::Skip)
            .download(&record())
            .await
            .unwrap();

        assert_eq!(outcome, DownloadOutcome::AlreadyExists(path.clone()));
        assert_eq!(archive.hits(VIDEO_URL), 0);
        assert_eq!(std::fs::read(&path).unwrap(), b"old");
    }

    #[tokio::test]
    async fn test_overwrite_replaces_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip_aaa.mp4");
        std::fs::write(&path, b"old").unwrap();

        let archive = Arc::new(MemoryArchive::new().file(VIDEO_URL, b"new bytes"));
        let d = downloader(archive.clone(), dir.path(), ExistingFileMode::Overwrite);

        d.download(&record()).await.unwrap();
        d.download(&record()).await.unwrap();

        assert_eq!(archive.hits(VIDEO_URL), 2);
        assert_eq!(std::fs::read(&path).unwrap(), b"new bytes");
    }

    #[tokio::test]
    async fn test_extension_follows_content_type() {
        let dir = tempfile::tempdir().unwrap();
        let stream_url = "https://web.archive.org/web/20191001000000id_/https://cdn.example/v/stream";
        let archive = Arc::new(MemoryArchive::new().route(
            stream_url,
            200,
            Some("video/webm"),
            b"webm bytes",
        ));

        let mut record = record();
        record.video_url = stream_url.to_string();
        let d = downloader(archive.clone(), dir.path(), ExistingFileMode::Skip);

        let outcome = d.download(&record).await.unwrap();
        let webm = dir.path().join("clip_aaa.webm");
        assert_eq!(
            outcome,
            DownloadOutcome::Downloaded {
                path: webm.clone(),
                bytes: 10
            }
        );
        assert_eq!(std::fs::read(&webm).unwrap(), b"webm bytes");
        assert!(!dir.path().join("clip_aaa.mp4").exists());

        // The renamed file still counts as present on the next run.
        let outcome = d.download(&record).await.unwrap();
        assert_eq!(outcome, DownloadOutcome::AlreadyExists(webm));
        assert_eq!(archive.hits(stream_url), 1);
    }

    #[tokio::test]
    async fn test_overwrite_replaces_file_with_other_extension() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("clip_aaa.webm"), b"old").unwrap();

        let archive = Arc::new(MemoryArchive::new().file(VIDEO_URL, b"new bytes"));
        downloader(archive, dir.path(), ExistingFileMode::Overwrite)
            .download(&record())
            .await
            .unwrap();

        assert!(!dir.path().join("clip_aaa.webm").exists());
        assert_eq!(
            std::fs::read(dir.path().join("clip_aaa.mp4")).unwrap(),
            b"new bytes"
        );
    }

    #[test]
    fn test_download_bar_only_for_large_files() {
        let archive = Arc::new(MemoryArchive::new());
        let multi = MultiProgress::with_draw_target(indicatif::ProgressDrawTarget::hidden());
        let d = Downloader::new(
            archive.clone(),
            PathBuf::from("unused"),
            ExistingFileMode::Skip,
            Some(multi),
        );

        assert!(d.download_bar(Some(PROGRESS_THRESHOLD + 1)).is_some());
        assert!(d.download_bar(Some(1024)).is_none());
        assert!(d.download_bar(None).is_none());

        let quiet = downloader(archive, Path::new("unused"), ExistingFileMode::Skip);
        assert!(quiet.download_bar(Some(PROGRESS_THRESHOLD + 1)).is_none());
    }

    #[tokio::test]
    async fn test_failed_fetch_leaves_nothing_behind() {
        let dir = tempfile::tempdir().unwrap();
        let archive = Arc::new(MemoryArchive::new().status(VIDEO_URL, 404));

        let result = downloader(archive, dir.path(), ExistingFileMode::Skip)
            .download(&record())
            .await;

        assert!(matches!(result, Err(Error::Fetch(_))));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_html_and_empty_bodies_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let archive = Arc::new(MemoryArchive::new().page(VIDEO_URL, "<html>gone</html>"));
        let result = downloader(archive, dir.path(), ExistingFileMode::Skip)
            .download(&record())
            .await;
        assert!(matches!(result, Err(Error::Download(_))));

        let archive = Arc::new(MemoryArchive::new().file(VIDEO_URL, b""));
        let result = downloader(archive, dir.path(), ExistingFileMode::Skip)
            .download(&record())
            .await;
        assert!(matches!(result, Err(Error::Download(_))));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
