//! Correlation id carried through a request.
//!
//! The HTTP middleware puts a [`TraceId`] in task-local scope for the
//! lifetime of a request. Errors created inside that scope pick it up, so a
//! client-visible error can be matched with server logs. Task locals are not
//! inherited by spawned tasks; wrap such work in [`TraceId::scope`].

use std::fmt;
use std::future::Future;
use std::str::FromStr;

use tokio::task_local;
use uuid::Uuid;

task_local! {
    pub(crate) static TRACE_ID: TraceId;
}

/// UUID correlating one request across logs and error payloads.
///
/// # Examples
/// ```
/// use photos_backend::TraceId;
///
/// async fn handler() {
///     if let Some(id) = TraceId::current() {
///         tracing::info!(trace_id = %id, "handling request");
///     }
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceId(pub(crate) Uuid);

impl TraceId {
    #[must_use]
    pub(crate) fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    #[must_use]
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Reuse an id forwarded by an upstream proxy, or mint a new one when it
    /// is absent or not a UUID.
    #[must_use]
    pub fn inherit_or_generate(forwarded: Option<&str>) -> Self {
        forwarded
            .and_then(|raw| raw.trim().parse().ok())
            .unwrap_or_else(Self::generate)
    }

    /// The id in scope for the current task, if any.
    #[must_use]
    pub fn current() -> Option<Self> {
        TRACE_ID.try_with(|id| *id).ok()
    }

    /// Run `fut` with `trace_id` in scope.
    ///
    /// # Examples
    /// ```
    /// use photos_backend::TraceId;
    ///
    /// # tokio::runtime::Runtime::new().unwrap().block_on(async {
    /// let trace_id: TraceId = "00000000-0000-0000-0000-000000000000"
    ///     .parse()
    ///     .expect("valid UUID");
    /// let observed = TraceId::scope(trace_id, async move { TraceId::current() }).await;
    /// assert_eq!(observed, Some(trace_id));
    /// # });
    /// ```
    pub async fn scope<Fut>(trace_id: TraceId, fut: Fut) -> Fut::Output
    where
        Fut: Future,
    {
        TRACE_ID.scope(trace_id, fut).await
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for TraceId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[tokio::test]
    async fn scope_exposes_the_id() {
        let expected = TraceId::generate();
        let observed = TraceId::scope(expected, async move { TraceId::current() }).await;
        assert_eq!(observed, Some(expected));
    }

    #[tokio::test]
    async fn nothing_is_in_scope_outside_a_request() {
        assert!(TraceId::current().is_none());
    }

    #[test]
    fn forwarded_uuid_is_kept() {
        let forwarded = "6f1c2a9e-3b4d-4c5e-8f70-0123456789ab";
        let trace_id = TraceId::inherit_or_generate(Some(forwarded));
        assert_eq!(trace_id.to_string(), forwarded);
    }

    #[rstest]
    #[case::absent(None)]
    #[case::garbage(Some("not-a-trace"))]
    #[case::empty(Some(""))]
    fn unusable_forwarded_ids_are_replaced(#[case] forwarded: Option<&str>) {
        let trace_id = TraceId::inherit_or_generate(forwarded);
        assert_ne!(trace_id, TraceId::from_uuid(Uuid::nil()));
        assert!(trace_id.to_string().parse::<TraceId>().is_ok());
    }
}
