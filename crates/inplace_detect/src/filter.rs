//! Iterator and stream adapters that drive a detector over a sequence.
//!
//! Both adapters forward changed descriptors in input order, pass upstream
//! errors through untouched, and stop after the first error. Nothing is
//! buffered: each item is fully processed before the next is pulled.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures::{ready, Stream};
use pin_project_lite::pin_project;

use crate::descriptor::FileDescriptor;
use crate::detector::ChangeDetector;
use crate::error::DetectError;
use crate::store::FingerprintCache;

/// Iterator returned by [`ChangeDetector::filter`].
#[derive(Debug)]
pub struct Changed<'a, I, C> {
    detector: &'a mut ChangeDetector<C>,
    files: I,
    done: bool,
}

impl<'a, I, C> Changed<'a, I, C> {
    pub(crate) fn new(detector: &'a mut ChangeDetector<C>, files: I) -> Self {
        Self {
            detector,
            files,
            done: false,
        }
    }
}

impl<I, C, E> Iterator for Changed<'_, I, C>
where
    I: Iterator<Item = Result<FileDescriptor, E>>,
    C: FingerprintCache,
    E: From<DetectError>,
{
    type Item = Result<FileDescriptor, E>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        for item in self.files.by_ref() {
            let file = match item {
                Ok(file) => file,
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            };
            match self.detector.process(file) {
                Ok(Some(file)) => return Some(Ok(file)),
                Ok(None) => {}
                Err(e) => {
                    self.done = true;
                    return Some(Err(e.into()));
                }
            }
        }
        self.done = true;
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.done {
            (0, Some(0))
        } else {
            (0, self.files.size_hint().1)
        }
    }
}

pin_project! {
    /// Stream returned by [`ChangeDetector::filter_stream`].
    #[derive(Debug)]
    pub struct ChangedStream<'a, S, C> {
        detector: &'a mut ChangeDetector<C>,
        #[pin]
        files: S,
        done: bool,
    }
}

impl<'a, S, C> ChangedStream<'a, S, C> {
    pub(crate) fn new(detector: &'a mut ChangeDetector<C>, files: S) -> Self {
        Self {
            detector,
            files,
            done: false,
        }
    }
}

impl<S, C, E> Stream for ChangedStream<'_, S, C>
where
    S: Stream<Item = Result<FileDescriptor, E>>,
    C: FingerprintCache,
    E: From<DetectError>,
{
    type Item = Result<FileDescriptor, E>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();
        if *this.done {
            return Poll::Ready(None);
        }
        loop {
            let file = match ready!(this.files.as_mut().poll_next(cx)) {
                Some(Ok(file)) => file,
                Some(Err(e)) => {
                    *this.done = true;
                    return Poll::Ready(Some(Err(e)));
                }
                None => {
                    *this.done = true;
                    return Poll::Ready(None);
                }
            };
            match this.detector.process(file) {
                Ok(Some(file)) => return Poll::Ready(Some(Ok(file))),
                Ok(None) => {}
                Err(e) => {
                    *this.done = true;
                    return Poll::Ready(Some(Err(e.into())));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::FileStat;
    use crate::store::FingerprintMap;
    use futures::executor::block_on;
    use futures::StreamExt;
    use inplace_common::Timestamp;
    use inplace_config::{DetectorOptions, Strategy};

    #[derive(Debug, PartialEq)]
    enum PipelineError {
        Source(&'static str),
        Detect(String),
    }

    impl From<DetectError> for PipelineError {
        fn from(e: DetectError) -> Self {
            PipelineError::Detect(e.to_string())
        }
    }

    fn file(path: &str, body: &str) -> Result<FileDescriptor, PipelineError> {
        Ok(FileDescriptor::new(path, Some(body.as_bytes().to_vec()))
            .with_stat(FileStat::file(Timestamp::from_millis(1))))
    }

    fn paths(files: &[FileDescriptor]) -> Vec<String> {
        files
            .iter()
            .map(|f| f.path.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn iterator_keeps_input_order() {
        let mut det = ChangeDetector::new(
            DetectorOptions::default().with_first_pass(true),
            FingerprintMap::new(),
        );
        let out: Result<Vec<_>, PipelineError> = det
            .filter(vec![file("/c", "1"), file("/a", "2"), file("/b", "3")])
            .collect();
        assert_eq!(paths(&out.unwrap()), ["/c", "/a", "/b"]);
    }

    #[test]
    fn iterator_drops_unchanged() {
        let cache: FingerprintMap = [("/a", inplace_common::Digest::of(b"1"))]
            .into_iter()
            .collect();
        let mut det = ChangeDetector::new(DetectorOptions::default(), cache);
        let out: Vec<_> = det
            .filter(vec![file("/a", "1"), file("/b", "2")])
            .collect::<Result<_, PipelineError>>()
            .unwrap();
        assert!(out.is_empty());
        assert_eq!(det.cache().len(), 2);
    }

    #[test]
    fn iterator_passes_upstream_error_and_stops() {
        let mut det = ChangeDetector::new(
            DetectorOptions::default().with_first_pass(true),
            FingerprintMap::new(),
        );
        let mut it = det.filter(vec![
            file("/a", "1"),
            Err(PipelineError::Source("disk gone")),
            file("/b", "2"),
        ]);
        assert!(matches!(it.next(), Some(Ok(_))));
        assert_eq!(it.next(), Some(Err(PipelineError::Source("disk gone"))));
        assert!(it.next().is_none());
        assert_eq!(it.size_hint(), (0, Some(0)));
        drop(it);
        assert_eq!(det.cache().len(), 1, "nothing after the fault is recorded");
    }

    #[test]
    fn iterator_surfaces_missing_metadata() {
        let mut det = ChangeDetector::new(
            DetectorOptions::new(Strategy::ModificationTime).with_first_pass(true),
            FingerprintMap::new(),
        );
        let bare = Ok(FileDescriptor::new("/bare", Some(b"x".to_vec())));
        let out: Vec<_> = det.filter(vec![file("/a", "1"), bare, file("/b", "2")]).collect();
        assert_eq!(out.len(), 2);
        assert!(out[0].is_ok());
        assert!(matches!(&out[1], Err(PipelineError::Detect(msg)) if msg.contains("/bare")));
        assert_eq!(det.cache().len(), 1);
    }

    #[test]
    fn stream_matches_iterator() {
        let mut det = ChangeDetector::new(
            DetectorOptions::default().with_first_pass(true),
            FingerprintMap::new(),
        );
        let input = futures::stream::iter(vec![file("/x", "1"), file("/y", "2"), file("/x", "1")]);
        let out: Vec<_> = block_on(det.filter_stream(input).collect::<Vec<_>>());
        let files: Vec<_> = out.into_iter().collect::<Result<_, PipelineError>>().unwrap();
        assert_eq!(paths(&files), ["/x", "/y"]);
    }

    #[test]
    fn stream_stops_after_upstream_error() {
        let mut det = ChangeDetector::new(
            DetectorOptions::default().with_first_pass(true),
            FingerprintMap::new(),
        );
        let input = futures::stream::iter(vec![
            Err(PipelineError::Source("boom")),
            file("/a", "1"),
        ]);
        let out: Vec<_> = block_on(det.filter_stream(input).collect::<Vec<_>>());
        assert_eq!(out, vec![Err(PipelineError::Source("boom"))]);
        assert!(det.cache().is_empty());
    }
}
