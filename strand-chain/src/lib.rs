#![deny(missing_docs)]
//! Push-based continuation chains.
//!
//! A chain is a source, any number of transform stages, and a terminal
//! sink, each a [`Component`](strand_core::Component) wired to the next
//! through its private `next` port. The source pushes the first value when
//! it is run; every stage awaits its upstream, applies its function and
//! pushes the result on; the sink runs a side effect and ends the run.
//!
//! Two families of nodes are provided:
//!
//! | Family | Contract | Source | Stage | Sink |
//! |--------|----------|--------|-------|------|
//! | Tasks | [`Continuation`](strand_core::Continuation) | [`TaskSource`] | [`TaskStage`] | [`TaskSink`] |
//! | Values | [`Dataflow`](strand_core::Dataflow) | [`ValueSource`] | [`ValueStage`] | [`ValueSink`] |
//!
//! The task family is the one to use for chains: each run carries a
//! [`RunContext`](strand_core::RunContext), so its outcome is observable
//! through a [`ChainHandle`](strand_core::ChainHandle). The value family
//! passes bare values and reports stage failures through an optional
//! `faults` port.
//!
//! Work is scheduled on the tokio runtime that called `run()`. Use a
//! current-thread runtime to keep every stage on one thread. Within a run
//! stage *i+1* never starts before stage *i*'s value has resolved,
//! however long that takes.

mod bind;
mod builder;
mod completion;
mod config;
mod error;
mod sink;
mod source;
mod stage;
mod value;

pub use bind::{Bindable, Continuable};
pub use builder::{Chain, ChainBuilder};
pub use completion::{Completer, Completion, completion};
pub use config::ChainConfig;
pub use error::ChainError;
pub use sink::TaskSink;
pub use source::TaskSource;
pub use stage::TaskStage;
pub use value::{StageFault, ValueSink, ValueSource, ValueStage};
