//! Tri-state view of a polled resource.

use super::failure::{classify, ErrorInfo, FailureClass};

/// Loading / error / data state of one polled resource.
///
/// Invariant: `is_loading` is true whenever `data` is absent and the last
/// failure (if any) was transient.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchState<T> {
    data: Option<T>,
    error: Option<ErrorInfo>,
    is_loading: bool,
}

/// How a [`FetchState`] should be rendered.
#[derive(Debug, PartialEq)]
pub enum FetchView<'a, T> {
    /// Nothing usable yet: skeleton / "loading" placeholder.
    Loading,
    /// A fatal failure: show the offline state with a retry hint.
    Offline(&'a ErrorInfo),
    Ready(&'a T),
}

impl<T> Default for FetchState<T> {
    fn default() -> Self {
        Self::loading()
    }
}

impl<T> FetchState<T> {
    /// The initial state of a source that has not received anything yet.
    pub fn loading() -> Self {
        Self {
            data: None,
            error: None,
            is_loading: true,
        }
    }

    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    /// The fatal error currently shown, if any.
    pub fn error(&self) -> Option<&ErrorInfo> {
        self.error.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    /// Record a successful fetch.
    pub fn apply_success(&mut self, data: T) {
        self.data = Some(data);
        self.error = None;
        self.is_loading = false;
    }

    /// Record a failed fetch and return how it was classified.
    ///
    /// Previous data is never discarded here; whether to show stale data
    /// next to an error is the presentation layer's decision.
    pub fn apply_failure(&mut self, error: ErrorInfo) -> FailureClass {
        let class = classify(Some(&error));
        match class {
            FailureClass::Transient => {
                self.error = None;
                self.is_loading = self.data.is_none();
            }
            FailureClass::Fatal => {
                self.error = Some(error);
                self.is_loading = false;
            }
        }
        class
    }

    /// Render decision: a fatal error wins over stale data.
    pub fn view(&self) -> FetchView<'_, T> {
        if let Some(error) = &self.error {
            FetchView::Offline(error)
        } else if let Some(data) = &self.data {
            FetchView::Ready(data)
        } else {
            FetchView::Loading
        }
    }
}
