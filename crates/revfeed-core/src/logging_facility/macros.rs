//! Lifecycle logging macros
//!
//! Each macro emits one event tagged with the calling module as
//! `component`, the operation name as `op` and a lifecycle `event`.
//! Extra `key = value` fields are passed through to `tracing` unchanged.

#[doc(hidden)]
#[macro_export]
macro_rules! __log_op_event {
    ($level:ident, $op:expr, $event:expr) => {
        tracing::$level!(component = module_path!(), op = $op, event = $event)
    };
    ($level:ident, $op:expr, $event:expr, $($field:tt)+) => {
        tracing::$level!(component = module_path!(), op = $op, event = $event, $($field)+)
    };
}

/// Operation started
///
/// ```
/// # use revfeed_core::log_op_start;
/// log_op_start!("updates_query");
/// log_op_start!("updates_query", baseline = 12u64);
/// ```
#[macro_export]
macro_rules! log_op_start {
    ($op:expr $(, $($field:tt)+)?) => {
        $crate::__log_op_event!(info, $op, $crate::core_types::schema::EVENT_START $(, $($field)+)?)
    };
}

/// Operation finished; `duration_ms` comes first
///
/// ```
/// # use revfeed_core::log_op_end;
/// log_op_end!("batch_run", duration_ms = 42u64, processed = 3u64);
/// ```
#[macro_export]
macro_rules! log_op_end {
    ($op:expr, duration_ms = $duration:expr $(, $($field:tt)+)?) => {
        $crate::__log_op_event!(
            info,
            $op,
            $crate::core_types::schema::EVENT_END,
            duration_ms = $duration
            $(, $($field)+)?
        )
    };
}

/// Operation failed
///
/// `$err` is anything convertible into [`ExError`](crate::errors::ExError);
/// its kind and stable code are attached as `err_kind` and `err_code`.
///
/// ```
/// # use revfeed_core::{log_op_error, errors::FeedError};
/// let err = FeedError::HistoryRetrievalInconsistency { item_id: "WI-1".to_string() };
/// log_op_error!("batch_run", err, duration_ms = 10u64);
/// ```
#[macro_export]
macro_rules! log_op_error {
    ($op:expr, $err:expr, duration_ms = $duration:expr $(, $($field:tt)+)?) => {{
        let ex_err: $crate::errors::ExError = $err.into();
        $crate::__log_op_event!(
            error,
            $op,
            $crate::core_types::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err_kind = ?ex_err.kind(),
            err_code = ex_err.code()
            $(, $($field)+)?
        )
    }};
}
