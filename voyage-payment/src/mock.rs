use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use voyage_core::payment::{CheckoutRequest, GatewayError, GatewayResponse, PaymentGateway};

/// Canned gateway answer.
#[derive(Debug, Clone)]
pub enum Reply {
    Ok(Value),
    Reject { status: u16, detail: String },
    Unreachable,
}

impl Reply {
    fn into_result(self) -> Result<GatewayResponse, GatewayError> {
        match self {
            Reply::Ok(body) => Ok(GatewayResponse(body)),
            Reply::Reject { status, detail } => Err(GatewayError::Rejected { status, detail }),
            Reply::Unreachable => Err(GatewayError::Transport("connection refused".to_string())),
        }
    }
}

/// In-process gateway that answers with configurable replies and counts calls.
/// Initialization echoes the request's `tx_ref` into a checkout URL by default.
pub struct ScriptedGateway {
    initialize_reply: Mutex<Option<Reply>>,
    verify_reply: Mutex<Reply>,
    initialize_calls: AtomicUsize,
    verify_calls: AtomicUsize,
    last_request: Mutex<Option<CheckoutRequest>>,
}

impl Default for ScriptedGateway {
    fn default() -> Self {
        Self {
            initialize_reply: Mutex::new(None),
            verify_reply: Mutex::new(Reply::Ok(json!({"status": "success", "data": {"status": "success"}}))),
            initialize_calls: AtomicUsize::new(0),
            verify_calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        }
    }
}

impl ScriptedGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_initialize(&self, reply: Reply) {
        *self.initialize_reply.lock().unwrap_or_else(|e| e.into_inner()) = Some(reply);
    }

    pub fn on_verify(&self, reply: Reply) {
        *self.verify_reply.lock().unwrap_or_else(|e| e.into_inner()) = reply;
    }

    /// Shorthand for a verify reply carrying `data.status`.
    pub fn verify_status(&self, status: &str) {
        self.on_verify(Reply::Ok(json!({"status": "success", "data": {"status": status}})));
    }

    pub fn initialize_calls(&self) -> usize {
        self.initialize_calls.load(Ordering::SeqCst)
    }

    pub fn verify_calls(&self) -> usize {
        self.verify_calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<CheckoutRequest> {
        self.last_request.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait]
impl PaymentGateway for ScriptedGateway {
    async fn initialize(&self, request: &CheckoutRequest) -> Result<GatewayResponse, GatewayError> {
        self.initialize_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap_or_else(|e| e.into_inner()) = Some(request.clone());

        let scripted = self.initialize_reply.lock().unwrap_or_else(|e| e.into_inner()).clone();
        match scripted {
            Some(reply) => reply.into_result(),
            None => Ok(GatewayResponse(json!({
                "message": "Hosted Link",
                "status": "success",
                "data": {"checkout_url": format!("https://checkout.test/{}", request.tx_ref)}
            }))),
        }
    }

    async fn verify(&self, _tx_ref: &str) -> Result<GatewayResponse, GatewayError> {
        self.verify_calls.fetch_add(1, Ordering::SeqCst);
        let reply = self.verify_reply.lock().unwrap_or_else(|e| e.into_inner()).clone();
        reply.into_result()
    }
}
