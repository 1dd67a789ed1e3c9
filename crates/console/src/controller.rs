//! The per-field edit/save/loading state machine.

use std::sync::Arc;

use serde_json::Value;
use tokio_util::sync::CancellationToken;

use opsdesk_core::{
    minimal_payload, reconcile, CommitMode, EditableEntity, EntitySnapshot, FieldEditState,
    FieldKey, FieldSavingState, FieldValue,
};
use opsdesk_gateway::{FormData, GatewayError, RemoteGateway, WritePayload};
use opsdesk_imageprep::{ImagePrepConfig, RawImage};

use crate::notice::{map_gateway_error, Notice};

/// Undrained notices are capped; the oldest drop first.
const MAX_NOTICES: usize = 32;

/// How a commit attempt settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    /// The write succeeded and the entity was re-fetched.
    Saved,
    /// The write failed; the edit is preserved and notices were queued.
    Failed,
    /// The view's cancellation scope fired mid-flight; nothing changed
    /// beyond clearing the saving flag.
    Cancelled,
    /// A commit for this field was already in flight; no request was
    /// issued.
    AlreadySaving,
    /// Nothing was sent: the field commits explicitly and only the
    /// local copy changed.
    NotCommitted,
}

/// A newly selected, not-yet-confirmed image.
///
/// Owned by the controller between selection and commit or
/// cancellation; the raw bytes double as the preview source for the
/// view.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingImage {
    pub raw: RawImage,
}

/// Per-entity edit controller for one detail page.
///
/// Owns the local working copy of the entity's editable fields, the
/// per-field edit and saving flags, the last authoritative snapshot,
/// and a cancellation scope tied to the view's lifetime. All failures
/// surface as [`Notice`]s drained via [`take_notices`](Self::take_notices);
/// nothing panics and nothing escapes the action that failed.
pub struct FieldEditController<K: FieldKey> {
    gateway: Arc<dyn RemoteGateway>,
    resource_path: String,
    /// Fields the backend requires on every partial update (e.g. a
    /// tenant discriminator), copied verbatim from the snapshot.
    context_fields: Vec<String>,
    image_config: ImagePrepConfig,
    cancel: CancellationToken,

    entity: EditableEntity<K>,
    snapshot: EntitySnapshot,
    edit: FieldEditState<K>,
    saving: FieldSavingState<K>,
    image_saving: bool,
    pending_image: Option<PendingImage>,
    notices: Vec<Notice<K>>,
}

/// Interpret a fetched body as an entity record object.
fn record_object(value: Value) -> serde_json::Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => {
            tracing::warn!(got = %kind_name(&other), "entity fetch returned a non-object body");
            serde_json::Map::new()
        }
    }
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

impl<K: FieldKey> FieldEditController<K> {
    /// Fetch the entity and build a controller seeded from it.
    ///
    /// The initial fetch is the one failure that propagates: without a
    /// record there is no page to render.
    pub async fn load(
        gateway: Arc<dyn RemoteGateway>,
        resource_path: impl Into<String>,
        context_fields: Vec<String>,
    ) -> Result<Self, GatewayError> {
        let resource_path = resource_path.into();
        let cancel = CancellationToken::new();
        let body = gateway
            .fetch_authenticated(&resource_path, &cancel.child_token())
            .await?;
        let record = record_object(body);

        Ok(Self {
            gateway,
            resource_path,
            context_fields,
            image_config: ImagePrepConfig::default(),
            cancel,
            entity: EditableEntity::seed(&record),
            snapshot: EntitySnapshot::new(record),
            edit: FieldEditState::new(),
            saving: FieldSavingState::new(),
            image_saving: false,
            pending_image: None,
            notices: Vec::new(),
        })
    }

    /// Override the upload preprocessing bounds.
    pub fn with_image_config(mut self, config: ImagePrepConfig) -> Self {
        self.image_config = config;
        self
    }

    // ---- accessors -------------------------------------------------------

    /// Current local value of a field.
    pub fn value(&self, field: K) -> &FieldValue {
        self.entity.get(field)
    }

    /// Is the field in edit mode?
    pub fn is_editing(&self, field: K) -> bool {
        self.edit.is_editing(field)
    }

    /// Is a save for the field in flight?
    pub fn is_saving(&self, field: K) -> bool {
        self.saving.is_saving(field)
    }

    /// Last authoritative server record.
    pub fn snapshot(&self) -> &EntitySnapshot {
        &self.snapshot
    }

    /// The not-yet-committed image, if one is selected.
    pub fn pending_image(&self) -> Option<&PendingImage> {
        self.pending_image.as_ref()
    }

    /// Drain queued user feedback.
    pub fn take_notices(&mut self) -> Vec<Notice<K>> {
        std::mem::take(&mut self.notices)
    }

    // ---- local edits -----------------------------------------------------

    /// Flip a field's edit mode. Pure local state; no network.
    pub fn toggle_edit(&mut self, field: K) {
        self.edit.toggle(field);
    }

    /// Write a new local value.
    ///
    /// For `CommitMode::Immediate` fields the change IS the commit
    /// trigger: the write is sent straight away. Explicit fields
    /// return [`CommitOutcome::NotCommitted`] and wait for
    /// [`commit`](Self::commit).
    pub async fn set_value(&mut self, field: K, value: FieldValue) -> CommitOutcome {
        self.entity.set(field, value);
        match field.commit_mode() {
            CommitMode::Immediate => self.commit(field).await,
            CommitMode::Explicit => CommitOutcome::NotCommitted,
        }
    }

    // ---- commits ---------------------------------------------------------

    /// Send one field's local value to the backend.
    ///
    /// The payload carries only the changed field plus the configured
    /// context fields. On success the edit flag clears and the entity
    /// is re-fetched (server wins). On failure the edit flag and the
    /// user's value stay intact and notices are queued. The saving
    /// flag clears unconditionally either way.
    pub async fn commit(&mut self, field: K) -> CommitOutcome {
        if self.saving.is_saving(field) {
            tracing::debug!(field = field.name(), "commit skipped: already in flight");
            return CommitOutcome::AlreadySaving;
        }

        let value = self.entity.get(field).clone();
        let body = match minimal_payload(field, &value, &self.context_fields, &self.snapshot) {
            Ok(body) => body,
            Err(error) => {
                tracing::error!(field = field.name(), %error, "cannot build commit payload");
                self.push_notice(Notice::Toast(error.to_string()));
                return CommitOutcome::Failed;
            }
        };

        self.saving.begin(field);
        let token = self.cancel.child_token();
        let result = self
            .gateway
            .update(&self.resource_path, WritePayload::Json(body.into()), &token)
            .await;
        self.saving.settle(field);

        self.settle_commit(field.name(), result, |ctl| ctl.edit.clear(field))
            .await
    }

    /// Select an image for upload; replaces any previous selection.
    pub fn select_image(&mut self, raw: RawImage) {
        self.pending_image = Some(PendingImage { raw });
    }

    /// Discard the pending image without uploading it.
    pub fn clear_pending_image(&mut self) {
        self.pending_image = None;
    }

    /// Upload the pending image as a multipart write.
    ///
    /// The file is preprocessed best-effort (falling back to the
    /// original bytes on failure) and appended under `attribute` --
    /// the server's expected field name, e.g. `profile_image` --
    /// alongside the configured context fields and any extra scalars.
    /// Nested extras flatten into bracket-path keys
    /// (`car[car_model]=...`). The pending image is consumed only on
    /// success.
    pub async fn commit_image(
        &mut self,
        attribute: &str,
        extra: &[(String, Value)],
    ) -> CommitOutcome {
        if self.image_saving {
            tracing::debug!(attribute, "image commit skipped: already in flight");
            return CommitOutcome::AlreadySaving;
        }
        let Some(pending) = self.pending_image.clone() else {
            self.push_notice(Notice::Toast("No image selected".to_string()));
            return CommitOutcome::Failed;
        };

        let prepared = opsdesk_imageprep::prepare(pending.raw, &self.image_config);

        let mut form = FormData::new();
        form.file(
            attribute,
            &prepared.file_name,
            &prepared.mime_type,
            prepared.bytes,
        );
        for (key, value) in extra {
            form.nested(key, value);
        }
        for name in &self.context_fields {
            if let Some(context) = self.snapshot.record.get(name) {
                form.scalar(name, context);
            }
        }

        self.image_saving = true;
        let token = self.cancel.child_token();
        let result = self
            .gateway
            .update(&self.resource_path, WritePayload::Form(form), &token)
            .await;
        self.image_saving = false;

        self.settle_commit(attribute, result, |ctl| ctl.pending_image = None)
            .await
    }

    /// Shared settlement rules for field and image commits.
    async fn settle_commit(
        &mut self,
        what: &str,
        result: Result<Value, GatewayError>,
        on_success: impl FnOnce(&mut Self),
    ) -> CommitOutcome {
        match result {
            Ok(_) => {
                on_success(self);
                self.refetch().await;
                CommitOutcome::Saved
            }
            Err(GatewayError::Cancelled) => {
                tracing::debug!(what, "commit cancelled");
                CommitOutcome::Cancelled
            }
            Err(error) => {
                tracing::warn!(what, %error, "commit failed");
                for notice in map_gateway_error(&error) {
                    self.push_notice(notice);
                }
                CommitOutcome::Failed
            }
        }
    }

    // ---- reconciliation --------------------------------------------------

    /// Re-fetch the entity and reconcile: the fresh record replaces
    /// the working copy in full and every edit/saving flag resets.
    ///
    /// A failed re-fetch queues notices and leaves local state as it
    /// was; a cancelled one is silent.
    pub async fn refetch(&mut self) {
        let token = self.cancel.child_token();
        match self
            .gateway
            .fetch_authenticated(&self.resource_path, &token)
            .await
        {
            Ok(body) => {
                let record = record_object(body);
                self.snapshot = reconcile(&mut self.entity, &mut self.edit, &mut self.saving, record);
            }
            Err(GatewayError::Cancelled) => {}
            Err(error) => {
                tracing::warn!(path = %self.resource_path, %error, "re-fetch failed");
                for notice in map_gateway_error(&error) {
                    self.push_notice(notice);
                }
            }
        }
    }

    /// Cancel the view's scope: every in-flight call for this
    /// controller settles as [`GatewayError::Cancelled`] and its
    /// result is discarded.
    pub fn close(&self) {
        self.cancel.cancel();
    }

    fn push_notice(&mut self, notice: Notice<K>) {
        if self.notices.len() == MAX_NOTICES {
            self.notices.remove(0);
        }
        self.notices.push(notice);
    }
}

impl<K: FieldKey> Drop for FieldEditController<K> {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests needing access to private state (the in-flight
    //! guard). The scenario tests live in `tests/controller.rs`.

    use super::*;
    use opsdesk_core::UserField;
    use serde_json::json;
    use std::sync::Mutex;

    struct OneShotGateway {
        calls: Mutex<usize>,
    }

    #[async_trait::async_trait]
    impl RemoteGateway for OneShotGateway {
        async fn fetch_public(
            &self,
            _path: &str,
            _cancel: &CancellationToken,
        ) -> Result<Value, GatewayError> {
            *self.calls.lock().unwrap() += 1;
            Ok(json!({}))
        }

        async fn fetch_authenticated(
            &self,
            _path: &str,
            _cancel: &CancellationToken,
        ) -> Result<Value, GatewayError> {
            *self.calls.lock().unwrap() += 1;
            Ok(json!({"name": "Alice", "status": "active"}))
        }

        async fn create(
            &self,
            _path: &str,
            _payload: WritePayload,
            _cancel: &CancellationToken,
        ) -> Result<Value, GatewayError> {
            *self.calls.lock().unwrap() += 1;
            Ok(json!({}))
        }

        async fn update(
            &self,
            _path: &str,
            _payload: WritePayload,
            _cancel: &CancellationToken,
        ) -> Result<Value, GatewayError> {
            *self.calls.lock().unwrap() += 1;
            Ok(json!({}))
        }
    }

    #[tokio::test]
    async fn in_flight_guard_short_circuits_without_a_request() {
        let gateway = Arc::new(OneShotGateway {
            calls: Mutex::new(0),
        });
        let mut ctl = FieldEditController::<UserField>::load(gateway.clone(), "/users/1", vec![])
            .await
            .unwrap();
        let after_load = *gateway.calls.lock().unwrap();

        // Simulate a commit already in flight for the field.
        ctl.saving.begin(UserField::Status);
        let outcome = ctl.commit(UserField::Status).await;

        assert_eq!(outcome, CommitOutcome::AlreadySaving);
        assert_eq!(*gateway.calls.lock().unwrap(), after_load);
        // The guard does not clear the in-flight marker.
        assert!(ctl.is_saving(UserField::Status));
    }

    #[tokio::test]
    async fn image_guard_short_circuits_too() {
        let gateway = Arc::new(OneShotGateway {
            calls: Mutex::new(0),
        });
        let mut ctl = FieldEditController::<UserField>::load(gateway.clone(), "/users/1", vec![])
            .await
            .unwrap();
        ctl.select_image(RawImage {
            file_name: "a.png".into(),
            mime_type: "image/png".into(),
            bytes: vec![1],
        });
        let after_load = *gateway.calls.lock().unwrap();

        ctl.image_saving = true;
        let outcome = ctl.commit_image("profile_image", &[]).await;

        assert_eq!(outcome, CommitOutcome::AlreadySaving);
        assert_eq!(*gateway.calls.lock().unwrap(), after_load);
    }
}
