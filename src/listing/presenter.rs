/// Display state of one listing. A failed fetch surfaces a single error for
/// the whole list; an empty successful result is a distinct state, not an
/// error. The presenter always lands back in a stable state after a failure.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewState<T> {
    Idle,
    Loading,
    Ready(Vec<T>),
    Empty,
    Error(String),
}

/// Opaque tag tying a fetch to the filter state that triggered it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTag(u64);

/// State machine for the listing view.
///
/// Every tab or category change begins a new fetch and bumps the generation;
/// a response is applied only when its tag is still current, so a slow stale
/// response can never overwrite the result of a newer request.
#[derive(Debug)]
pub struct Presenter<T> {
    generation: u64,
    state: ViewState<T>,
}

impl<T> Default for Presenter<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Presenter<T> {
    pub fn new() -> Self {
        Self {
            generation: 0,
            state: ViewState::Idle,
        }
    }

    /// Starts a fetch: the view goes to `Loading` and any response from an
    /// earlier fetch becomes stale.
    pub fn begin_fetch(&mut self) -> FetchTag {
        self.generation += 1;
        self.state = ViewState::Loading;
        FetchTag(self.generation)
    }

    /// Applies a fetch result. Returns `false` (leaving the state untouched)
    /// when the tag is stale.
    pub fn apply(&mut self, tag: FetchTag, result: Result<Vec<T>, String>) -> bool {
        if tag.0 != self.generation {
            return false;
        }
        self.state = match result {
            Ok(items) if items.is_empty() => ViewState::Empty,
            Ok(items) => ViewState::Ready(items),
            Err(message) => ViewState::Error(message),
        };
        true
    }

    pub fn state(&self) -> &ViewState<T> {
        &self.state
    }

    pub fn into_state(self) -> ViewState<T> {
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn begin_fetch_enters_loading() {
        let mut p: Presenter<u32> = Presenter::new();
        assert_eq!(*p.state(), ViewState::Idle);
        p.begin_fetch();
        assert_eq!(*p.state(), ViewState::Loading);
    }

    #[test]
    fn successful_fetch_becomes_ready() {
        let mut p = Presenter::new();
        let tag = p.begin_fetch();
        assert!(p.apply(tag, Ok(vec![1, 2, 3])));
        assert_eq!(*p.state(), ViewState::Ready(vec![1, 2, 3]));
    }

    #[test]
    fn empty_result_is_not_an_error() {
        let mut p: Presenter<u32> = Presenter::new();
        let tag = p.begin_fetch();
        assert!(p.apply(tag, Ok(vec![])));
        assert_eq!(*p.state(), ViewState::Empty);
    }

    #[test]
    fn failure_is_a_whole_list_error_and_state_is_stable() {
        let mut p: Presenter<u32> = Presenter::new();
        let tag = p.begin_fetch();
        assert!(p.apply(tag, Err("Failed to fetch news".into())));
        assert_eq!(*p.state(), ViewState::Error("Failed to fetch news".into()));

        // A new fetch recovers from the error state.
        let tag = p.begin_fetch();
        assert!(p.apply(tag, Ok(vec![7])));
        assert_eq!(*p.state(), ViewState::Ready(vec![7]));
    }

    #[test]
    fn stale_response_is_discarded() {
        let mut p = Presenter::new();
        let first = p.begin_fetch();
        // The filter changes while the first request is in flight.
        let second = p.begin_fetch();

        // The slow first response arrives late and must not apply.
        assert!(!p.apply(first, Ok(vec![1])));
        assert_eq!(*p.state(), ViewState::Loading);

        assert!(p.apply(second, Ok(vec![2])));
        assert_eq!(*p.state(), ViewState::Ready(vec![2]));
    }

    #[test]
    fn stale_error_cannot_clobber_a_newer_result() {
        let mut p = Presenter::new();
        let first = p.begin_fetch();
        let second = p.begin_fetch();
        assert!(p.apply(second, Ok(vec![5])));
        assert!(!p.apply(first, Err("timeout".into())));
        assert_eq!(*p.state(), ViewState::Ready(vec![5]));
    }
}
