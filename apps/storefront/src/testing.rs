//! In-process [`OrderApi`] and session builders for tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};

use marquee_core::persistence::MemorySlot;
use marquee_core::rate_limit::ManualClock;
use marquee_core::{ContactDetails, ContactMessage};

use crate::api::{Acknowledgement, OrderApi, PaymentSubmission};
use crate::config::StorefrontConfig;
use crate::error::ClientError;
use crate::Storefront;

/// A buyer form that passes validation.
pub(crate) fn buyer() -> ContactDetails {
    ContactDetails {
        first_name: "Ada".into(),
        last_name: "Obi".into(),
        email: "ada@example.com".into(),
        phone: "08012345678".into(),
        location: "Lagos".into(),
        whatsapp: "08012345678".into(),
    }
}

/// Session over an in-memory cart and a fake server.
pub(crate) fn session() -> (Storefront, Arc<FakeApi>) {
    let (sf, api, _clock) = session_with(FakeApi::new());
    (sf, api)
}

/// Like [`session`], also handing back the session clock.
pub(crate) fn session_with(api: FakeApi) -> (Storefront, Arc<FakeApi>, ManualClock) {
    let api = Arc::new(api);
    let clock = ManualClock::new(1_700_000_000_000);
    let sf = Storefront::new(
        StorefrontConfig::default(),
        Box::new(MemorySlot::new()),
        api.clone(),
        Arc::new(clock.clone()),
    );
    (sf, api, clock)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Accept,
    Reject,
    Down,
}

pub(crate) struct FakeApi {
    mode: Mutex<Mode>,
    price: Mutex<Value>,
    fetches: AtomicUsize,
    pub payments: Mutex<Vec<PaymentSubmission>>,
    pub contacts: Mutex<Vec<ContactMessage>>,
    pub subscriptions: Mutex<Vec<String>>,
}

impl FakeApi {
    pub fn with_price(price: Value) -> Self {
        FakeApi {
            mode: Mutex::new(Mode::Accept),
            price: Mutex::new(price),
            fetches: AtomicUsize::new(0),
            payments: Mutex::new(Vec::new()),
            contacts: Mutex::new(Vec::new()),
            subscriptions: Mutex::new(Vec::new()),
        }
    }

    pub fn new() -> Self {
        Self::with_price(json!(6499))
    }

    /// Every call fails as if the server were unreachable.
    pub fn failing() -> Self {
        let api = Self::new();
        api.set_mode(Mode::Down);
        api
    }

    /// Submissions answer 400 with `Invalid order data`.
    pub fn rejecting() -> Self {
        let api = Self::new();
        api.set_mode(Mode::Reject);
        api
    }

    pub fn recover(&self) {
        self.set_mode(Mode::Accept);
    }

    pub fn set_price(&self, price: Value) {
        *self.price.lock().unwrap() = price;
    }

    pub fn price_fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    fn set_mode(&self, mode: Mode) {
        *self.mode.lock().unwrap() = mode;
    }

    fn outcome(&self, message: &str, reference: Option<String>) -> Result<Acknowledgement, ClientError> {
        match *self.mode.lock().unwrap() {
            Mode::Accept => Ok(Acknowledgement {
                message: message.to_string(),
                reference,
            }),
            Mode::Reject => Err(ClientError::Rejected {
                status: 400,
                message: "Invalid order data".into(),
            }),
            Mode::Down => Err(ClientError::Network("connection refused".into())),
        }
    }
}

#[async_trait]
impl OrderApi for FakeApi {
    async fn submit_payment(
        &self,
        submission: PaymentSubmission,
    ) -> Result<Acknowledgement, ClientError> {
        let result = self.outcome("Payment submitted successfully", Some("ref-1".into()));
        if result.is_ok() {
            self.payments.lock().unwrap().push(submission);
        }
        result
    }

    async fn submit_contact(&self, message: &ContactMessage) -> Result<Acknowledgement, ClientError> {
        let result = self.outcome("Message sent successfully", None);
        if result.is_ok() {
            self.contacts.lock().unwrap().push(message.clone());
        }
        result
    }

    async fn subscribe_newsletter(&self, email: &str) -> Result<Acknowledgement, ClientError> {
        let result = self.outcome("Subscribed successfully", None);
        if result.is_ok() {
            self.subscriptions.lock().unwrap().push(email.to_string());
        }
        result
    }

    async fn fetch_ticket_price(&self) -> Result<Value, ClientError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if *self.mode.lock().unwrap() == Mode::Down {
            return Err(ClientError::Network("connection refused".into()));
        }
        Ok(self.price.lock().unwrap().clone())
    }
}
