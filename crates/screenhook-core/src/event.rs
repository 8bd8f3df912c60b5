//! Event normalization for the analytics pipeline.
//!
//! The platform sends a different JSON shape per event kind; everything
//! is flattened onto one fixed record before storage. Each known kind
//! carries its own field-assignment rule, and kinds without a rule are
//! still accepted so future platform events are never dropped.

use serde_json::Value;

/// Constant `source` value stamped on every record.
const SOURCE_WEBHOOK: &str = "webhook";

/// Event kinds with a dedicated normalization rule.
///
/// The discriminator arrives as the top-level `event` string in the
/// request body. Anything not listed here is treated as unmonitored:
/// persisted with all event-specific fields null.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// A platform account was created.
    UserCreated,
    /// A user signed in.
    UserSignedIn,
    /// A user changed their stored payment method.
    PaymentMethodUpdated,
    /// A user gained access to an offer.
    OwnershipCreated,
    /// Profile fields changed; the payload carries a `changes` object.
    UserUpdated,
    /// A video playback started.
    VideoPlay,
    /// A video was added to a user's favorites.
    AddedToFavorites,
    /// A subscription was canceled.
    SubscriptionCanceled,
    /// An order completed; carries customer and pricing fields.
    OrderPaid,
    /// A recurring charge succeeded.
    SuccessRecurring,
    /// An invoice passed its due date unpaid.
    InvoiceOverdue,
}

impl EventKind {
    /// Every kind with a dedicated rule, in dispatch order.
    pub const ALL: [Self; 11] = [
        Self::UserCreated,
        Self::UserSignedIn,
        Self::PaymentMethodUpdated,
        Self::OwnershipCreated,
        Self::UserUpdated,
        Self::VideoPlay,
        Self::AddedToFavorites,
        Self::SubscriptionCanceled,
        Self::OrderPaid,
        Self::SuccessRecurring,
        Self::InvoiceOverdue,
    ];

    /// Parses the wire discriminator into a kind.
    ///
    /// Returns `None` for unmonitored kinds; the caller persists those
    /// anyway and only logs the miss.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "user_created" => Some(Self::UserCreated),
            "user_signed_in" => Some(Self::UserSignedIn),
            "payment_method_updated" => Some(Self::PaymentMethodUpdated),
            "ownership_created" => Some(Self::OwnershipCreated),
            "user_updated" => Some(Self::UserUpdated),
            "video_play" => Some(Self::VideoPlay),
            "added_to_favorites" => Some(Self::AddedToFavorites),
            "subscription_canceled" => Some(Self::SubscriptionCanceled),
            "order_paid" => Some(Self::OrderPaid),
            "success_recurring" => Some(Self::SuccessRecurring),
            "invoice_overdue" => Some(Self::InvoiceOverdue),
            _ => None,
        }
    }

    /// The wire name of this kind.
    pub const fn name(self) -> &'static str {
        match self {
            Self::UserCreated => "user_created",
            Self::UserSignedIn => "user_signed_in",
            Self::PaymentMethodUpdated => "payment_method_updated",
            Self::OwnershipCreated => "ownership_created",
            Self::UserUpdated => "user_updated",
            Self::VideoPlay => "video_play",
            Self::AddedToFavorites => "added_to_favorites",
            Self::SubscriptionCanceled => "subscription_canceled",
            Self::OrderPaid => "order_paid",
            Self::SuccessRecurring => "success_recurring",
            Self::InvoiceOverdue => "invoice_overdue",
        }
    }

    /// Applies this kind's field-assignment rule to `record`.
    ///
    /// Missing payload fields surface as null, never as an error.
    fn apply(self, record: &mut CanonicalEvent, payload: &Value) {
        match self {
            Self::UserCreated => {
                record.user_id = int(payload, "id");
                record.email = text(payload, "email");
                record.fullname = text(payload, "name");
                record.custom_fields = raw_json(payload, "custom_fields");
            },
            Self::UserSignedIn | Self::PaymentMethodUpdated => {
                record.user_id = int(payload, "id");
                record.email = text(payload, "email");
                record.fullname = text(payload, "name");
            },
            Self::OwnershipCreated | Self::SubscriptionCanceled | Self::SuccessRecurring => {
                record.user_id = int(payload, "id");
                record.email = text(payload, "email");
                record.fullname = text(payload, "name");
                record.offer_id = int(payload, "offer_id");
                record.custom_fields = text(payload, "offer_title");
            },
            Self::UserUpdated => {
                // Profile updates deliberately strip identity fields and
                // keep only the change set.
                record.user_id = int(payload, "id");
                record.email = None;
                record.fullname = None;
                record.custom_fields = raw_json(payload, "changes");
            },
            Self::VideoPlay | Self::AddedToFavorites => {
                record.video_id = int(payload, "id");
                record.email = text(payload, "email");
                record.fullname = text(payload, "name");
                record.custom_fields = text(payload, "title");
            },
            Self::OrderPaid => {
                record.order_id = int(payload, "id");
                record.email = text(payload, "customer_email");
                record.fullname = text(payload, "customer_name");
                record.offer_id = int(payload, "offer_id");
                record.total = numeric(payload, "total");
                record.amount = numeric(payload, "amount");
                record.discount = numeric(payload, "discount");
            },
            Self::InvoiceOverdue => {
                // The platform puts the account id under `user_id` here,
                // not `id` as every other kind does.
                record.user_id = int(payload, "user_id");
                record.email = text(payload, "email");
                record.fullname = text(payload, "name");
                record.offer_id = int(payload, "offer_id");
                record.custom_fields = text(payload, "title");
                record.total = numeric(payload, "final_price");
                record.invoice_id = int(payload, "invoice_id");
            },
        }
    }
}

/// The fixed analytics record every event is normalized into.
///
/// All 14 persisted fields exist on every record; event-specific fields
/// that the payload does not populate stay null. Records are built once
/// per request and never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalEvent {
    /// Constant `"webhook"`; distinguishes this ingestion path in the table.
    pub source: String,
    /// Publication identifier taken from the request route.
    pub publication: String,
    /// The raw `event` discriminator, known kind or not.
    pub event: String,
    /// User email, where the event carries one.
    pub email: Option<String>,
    /// User display name, where the event carries one.
    pub fullname: Option<String>,
    /// Platform user id.
    pub user_id: Option<i32>,
    /// Video id for playback and favorites events.
    pub video_id: Option<i32>,
    /// Offer id for purchase and subscription events.
    pub offer_id: Option<i32>,
    /// Invoice id for billing events.
    pub invoice_id: Option<i32>,
    /// Order id for completed orders.
    pub order_id: Option<i32>,
    /// Kind-dependent free text: a serialized JSON blob for account
    /// events, a plain title for video and offer events.
    pub custom_fields: Option<String>,
    /// Order or invoice total, stored as text.
    pub total: Option<String>,
    /// Amount charged, stored as text.
    pub amount: Option<String>,
    /// Discount applied, stored as text.
    pub discount: Option<String>,

    kind: Option<EventKind>,
}

impl CanonicalEvent {
    /// Builds the canonical record for one inbound event.
    ///
    /// Pure transformation: no I/O, no failure. Unrecognized `event`
    /// values produce a record with only the three constant fields
    /// populated, flagged unmonitored via [`CanonicalEvent::is_monitored`].
    pub fn normalize(event: &str, payload: &Value, publication: &str) -> Self {
        let kind = EventKind::from_name(event);

        let mut record = Self {
            source: SOURCE_WEBHOOK.to_string(),
            publication: publication.to_string(),
            event: event.to_string(),
            email: None,
            fullname: None,
            user_id: None,
            video_id: None,
            offer_id: None,
            invoice_id: None,
            order_id: None,
            custom_fields: None,
            total: None,
            amount: None,
            discount: None,
            kind,
        };

        if let Some(kind) = kind {
            kind.apply(&mut record, payload);
        }

        record
    }

    /// The parsed kind, if the discriminator matched a known rule.
    pub fn kind(&self) -> Option<EventKind> {
        self.kind
    }

    /// Whether the event kind has a dedicated normalization rule.
    ///
    /// Unmonitored records are persisted like any other; this flag only
    /// feeds the observability side-channel.
    pub fn is_monitored(&self) -> bool {
        self.kind.is_some()
    }
}

/// Reads a string field, absent or non-string values become null.
fn text(payload: &Value, key: &str) -> Option<String> {
    payload.get(key)?.as_str().map(str::to_owned)
}

/// Reads an integer field. Out-of-range or non-integer values become
/// null rather than failing normalization.
fn int(payload: &Value, key: &str) -> Option<i32> {
    payload.get(key)?.as_i64()?.try_into().ok()
}

/// Reads a numeric field that may arrive as a JSON number or a string,
/// normalized to text for the numeric-as-text columns.
fn numeric(payload: &Value, key: &str) -> Option<String> {
    match payload.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Serializes a field's JSON value verbatim, absent fields become null.
fn raw_json(payload: &Value, key: &str) -> Option<String> {
    payload.get(key).map(Value::to_string)
}
