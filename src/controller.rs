//! Form controller for a single postal-code-to-address lookup.
//!
//! The controller is a plain state object with no UI binding: a driver feeds
//! it input text and submit events, dispatches the [`LookupRequest`] it hands
//! back, and reports the outcome through [`AddressLookupController::resolve`].
//! Rendering is a pure function of [`UiState`].

use crate::error::{INVALID_LENGTH_MESSAGE, LookupError};
use crate::normalize::{NormalizePolicy, PostalCode};
use crate::types::Address;

/// Transport seam between the controller and the lookup service
#[allow(async_fn_in_trait)]
pub trait AddressLookup {
    async fn lookup(&self, code: &PostalCode) -> Result<Address, LookupError>;
}

/// Form state. Exactly one variant holds at a time; the resolved address is
/// only reachable through `Success`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum UiState {
    #[default]
    Idle,
    Loading,
    Success(Address),
    Error(String),
}

/// A validated lookup ready to dispatch, stamped with the generation that
/// produced it
#[derive(Debug, Clone)]
pub struct LookupRequest {
    pub code: PostalCode,
    pub generation: u64,
}

pub struct AddressLookupController {
    input: String,
    policy: NormalizePolicy,
    state: UiState,
    generation: u64,
}

impl AddressLookupController {
    pub fn new() -> Self {
        Self::with_policy(NormalizePolicy::default())
    }

    pub fn with_policy(policy: NormalizePolicy) -> Self {
        Self {
            input: String::new(),
            policy,
            state: UiState::Idle,
            generation: 0,
        }
    }

    /// Overwrite the input buffer. Has no other effect on state.
    pub fn on_input_change(&mut self, text: &str) {
        self.input = text.to_string();
    }

    /// Handle a submit event.
    ///
    /// Returns the request to dispatch, or `None` if submission is disabled
    /// (a lookup is already in flight) or the input failed validation. On
    /// validation failure the state becomes `Error` and no request is ever
    /// produced. On success, any prior result or error is cleared by the
    /// transition into `Loading`.
    pub fn on_submit(&mut self) -> Option<LookupRequest> {
        if self.is_loading() {
            return None;
        }

        let code = match PostalCode::parse(&self.input, self.policy) {
            Ok(code) => code,
            Err(err) => {
                tracing::debug!("rejected input: {}", err);
                self.state = UiState::Error(INVALID_LENGTH_MESSAGE.to_string());
                return None;
            }
        };

        self.state = UiState::Loading;
        self.generation += 1;
        Some(LookupRequest {
            code,
            generation: self.generation,
        })
    }

    /// Apply the outcome of a dispatched lookup.
    ///
    /// A result whose generation is not the current one is stale (a newer
    /// submission superseded it) and is dropped, as is a duplicate resolution
    /// of an already-settled request.
    pub fn resolve(&mut self, generation: u64, result: Result<Address, LookupError>) {
        if generation != self.generation || !self.is_loading() {
            tracing::debug!("dropping stale lookup result (generation {})", generation);
            return;
        }

        self.state = match result {
            Ok(address) => UiState::Success(address),
            Err(err) => {
                if !matches!(err, LookupError::NotFound) {
                    tracing::error!("lookup failed: {}", err);
                }
                UiState::Error(err.user_message().to_string())
            }
        };
    }

    /// Run one full submit cycle against the given transport.
    pub async fn submit_with<L: AddressLookup>(&mut self, lookup: &L) {
        if let Some(request) = self.on_submit() {
            let result = lookup.lookup(&request.code).await;
            self.resolve(request.generation, result);
        }
    }

    pub fn state(&self) -> &UiState {
        &self.state
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, UiState::Loading)
    }

    /// Whether a submit event would be accepted right now
    pub fn is_submit_enabled(&self) -> bool {
        !self.is_loading()
    }

    /// The resolved address, present only in the `Success` state
    pub fn address(&self) -> Option<&Address> {
        match &self.state {
            UiState::Success(address) => Some(address),
            _ => None,
        }
    }

    /// The visible error message, present only in the `Error` state
    pub fn error_message(&self) -> Option<&str> {
        match &self.state {
            UiState::Error(message) => Some(message),
            _ => None,
        }
    }
}

impl Default for AddressLookupController {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    enum Outcome {
        Found(Address),
        NotFound,
        Failure,
    }

    struct MockLookup {
        outcome: Outcome,
    }

    impl MockLookup {
        fn found(prefecture: &str, city: &str, town: &str) -> Self {
            Self {
                outcome: Outcome::Found(Address {
                    prefecture: prefecture.to_string(),
                    city: city.to_string(),
                    town: town.to_string(),
                }),
            }
        }
    }

    impl AddressLookup for MockLookup {
        async fn lookup(&self, _code: &PostalCode) -> Result<Address, LookupError> {
            match &self.outcome {
                Outcome::Found(address) => Ok(address.clone()),
                Outcome::NotFound => Err(LookupError::NotFound),
                Outcome::Failure => Err(LookupError::Parse(
                    serde_json::from_str::<serde_json::Value>("garbage").unwrap_err(),
                )),
            }
        }
    }

    #[test]
    fn starts_idle_with_submit_enabled() {
        let controller = AddressLookupController::new();
        assert_eq!(controller.state(), &UiState::Idle);
        assert!(controller.is_submit_enabled());
        assert!(controller.address().is_none());
    }

    #[test]
    fn invalid_length_shows_error_without_dispatching() {
        let mut controller = AddressLookupController::new();
        controller.on_input_change("123-456");
        assert!(controller.on_submit().is_none());
        assert_eq!(controller.error_message(), Some("郵便番号は7桁で入力してください"));
        assert!(controller.address().is_none());
        // the form stays usable
        assert!(controller.is_submit_enabled());
    }

    #[test]
    fn valid_submit_enters_loading_and_disables_submit() {
        let mut controller = AddressLookupController::new();
        controller.on_input_change("100-0001");
        let request = controller.on_submit().unwrap();
        assert_eq!(request.code.as_str(), "1000001");
        assert!(controller.is_loading());
        assert!(!controller.is_submit_enabled());
        // prior fields are cleared while the lookup is in flight
        assert!(controller.address().is_none());
        assert!(controller.error_message().is_none());
    }

    #[test]
    fn resubmit_while_loading_is_refused() {
        let mut controller = AddressLookupController::new();
        controller.on_input_change("1000001");
        let first = controller.on_submit().unwrap();
        assert!(controller.on_submit().is_none());
        assert!(controller.is_loading());
        // the original request still settles normally
        controller.resolve(first.generation, Err(LookupError::NotFound));
        assert!(!controller.is_loading());
    }

    #[test]
    fn success_populates_all_fields() {
        let mut controller = AddressLookupController::new();
        controller.on_input_change("1000001");
        let request = controller.on_submit().unwrap();
        controller.resolve(
            request.generation,
            Ok(Address {
                prefecture: "A".to_string(),
                city: "B".to_string(),
                town: "C".to_string(),
            }),
        );
        assert!(!controller.is_loading());
        assert!(controller.is_submit_enabled());
        let address = controller.address().unwrap();
        assert_eq!(address.prefecture, "A");
        assert_eq!(address.city, "B");
        assert_eq!(address.town, "C");
        assert_eq!(address.full_address(), "ABC");
    }

    #[test]
    fn not_found_shows_message_with_empty_fields() {
        let mut controller = AddressLookupController::new();
        controller.on_input_change("9999999");
        let request = controller.on_submit().unwrap();
        controller.resolve(request.generation, Err(LookupError::NotFound));
        assert!(!controller.is_loading());
        assert_eq!(controller.error_message(), Some("該当する住所が見つかりませんでした"));
        assert!(controller.address().is_none());
    }

    #[test]
    fn stale_resolution_is_dropped() {
        let mut controller = AddressLookupController::new();
        controller.on_input_change("1000001");
        let first = controller.on_submit().unwrap();
        controller.resolve(first.generation, Err(LookupError::NotFound));

        controller.on_input_change("1500041");
        let second = controller.on_submit().unwrap();
        assert!(second.generation > first.generation);

        // a late duplicate of the first request must not overwrite Loading
        controller.resolve(
            first.generation,
            Ok(Address {
                prefecture: "X".to_string(),
                city: "Y".to_string(),
                town: "Z".to_string(),
            }),
        );
        assert!(controller.is_loading());

        controller.resolve(
            second.generation,
            Ok(Address {
                prefecture: "東京都".to_string(),
                city: "渋谷区".to_string(),
                town: "神南".to_string(),
            }),
        );
        assert_eq!(controller.address().unwrap().city, "渋谷区");
    }

    #[test]
    fn duplicate_resolution_after_settling_is_dropped() {
        let mut controller = AddressLookupController::new();
        controller.on_input_change("1000001");
        let request = controller.on_submit().unwrap();
        controller.resolve(
            request.generation,
            Ok(Address {
                prefecture: "A".to_string(),
                city: "B".to_string(),
                town: "C".to_string(),
            }),
        );
        controller.resolve(request.generation, Err(LookupError::NotFound));
        assert!(controller.address().is_some());
    }

    #[test]
    fn new_submission_clears_previous_result() {
        let mut controller = AddressLookupController::new();
        controller.on_input_change("1000001");
        let request = controller.on_submit().unwrap();
        controller.resolve(
            request.generation,
            Ok(Address {
                prefecture: "A".to_string(),
                city: "B".to_string(),
                town: "C".to_string(),
            }),
        );
        assert!(controller.address().is_some());

        controller.on_input_change("1500041");
        controller.on_submit().unwrap();
        assert!(controller.is_loading());
        assert!(controller.address().is_none());
    }

    #[tokio::test]
    async fn submit_with_runs_a_full_cycle() {
        let mut controller = AddressLookupController::new();
        controller.on_input_change("１００-０００１");
        controller.submit_with(&MockLookup::found("東京都", "千代田区", "千代田")).await;
        assert_eq!(controller.address().unwrap().full_address(), "東京都千代田区千代田");
    }

    #[tokio::test]
    async fn submit_with_surfaces_transport_failures() {
        let mut controller = AddressLookupController::new();
        controller.on_input_change("1000001");
        controller
            .submit_with(&MockLookup {
                outcome: Outcome::Failure,
            })
            .await;
        assert_eq!(
            controller.error_message(),
            Some("住所の取得に失敗しました。ネットワーク接続を確認してください。")
        );
        assert!(controller.address().is_none());
        assert!(controller.is_submit_enabled());
    }

    #[tokio::test]
    async fn submit_with_invalid_input_never_calls_transport() {
        struct PanicLookup;
        impl AddressLookup for PanicLookup {
            async fn lookup(&self, _code: &PostalCode) -> Result<Address, LookupError> {
                panic!("transport must not be reached for invalid input");
            }
        }

        let mut controller = AddressLookupController::new();
        controller.on_input_change("123");
        controller.submit_with(&PanicLookup).await;
        assert_eq!(controller.error_message(), Some("郵便番号は7桁で入力してください"));
    }

    #[tokio::test]
    async fn ascii_policy_discards_fullwidth_digits() {
        let mut controller =
            AddressLookupController::with_policy(NormalizePolicy::AsciiOnly);
        controller.on_input_change("１００-０００１");
        controller
            .submit_with(&MockLookup {
                outcome: Outcome::NotFound,
            })
            .await;
        // all seven digits were fullwidth, so normalization yields nothing
        assert_eq!(controller.error_message(), Some("郵便番号は7桁で入力してください"));
    }
}
