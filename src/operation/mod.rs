//! Abstract operations, their results, and the classification the driver
//! core needs to derive dependent work.
//!
//! The concrete catalogue of benchmark queries lives outside this crate; the
//! core only sees operations through the traits below.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Scheduled times are epoch milliseconds.
pub type TimeMilli = i64;

pub type PersonId = u64;
pub type MessageId = u64;

/// One unit of benchmark work: a query or update with a scheduled start time.
///
/// Operations are value-like; ownership passes from generator to scheduler to
/// executor. Only the scheduled start time is mutated, and only before the
/// operation is handed to the executor.
pub trait Operation: fmt::Debug + Send {
    /// Long read / short read / update classification of this operation.
    fn class(&self) -> OperationClass;

    /// When this operation is due to run, if a generator has scheduled it.
    fn scheduled_start_time(&self) -> Option<TimeMilli>;

    /// Set by generators before the operation is submitted for execution.
    fn set_scheduled_start_time(&mut self, start_time: TimeMilli);

    /// Earliest time at which this operation's inputs are known valid.
    fn dependency_time(&self) -> Option<TimeMilli> {
        None
    }
}

/// Captured result of one executed operation.
///
/// Results expose the identifiers that dependent short reads can be derived
/// from. Kinds whose results carry no such identifiers keep the empty
/// defaults.
pub trait OperationResult: fmt::Debug + Send {
    fn person_ids(&self) -> Vec<PersonId> {
        Vec::new()
    }

    fn message_ids(&self) -> Vec<MessageId> {
        Vec::new()
    }
}

/// Construction of concrete short read operations from polled identifiers.
///
/// Implemented by the workload's operation catalogue. The returned operation
/// has no scheduled start time yet; the generator assigns one.
pub trait OperationCatalogue: Send + Sync {
    fn create_short_read(&self, kind: ShortReadKind, id: u64) -> Box<dyn Operation>;
}

/// How the driver treats an operation when deriving dependent work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationClass {
    /// Primary read kind; may start a dependent short read chain.
    LongRead,
    /// Lightweight dependent read kind.
    ShortRead(ShortReadKind),
    /// Write kind; never produces dependent short reads.
    Update,
}

/// The seven dependent short read kinds.
///
/// The first three form the person chain, the remaining four the message
/// chain. Variant order within a chain is the first-factory priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShortReadKind {
    PersonProfile,
    PersonPosts,
    PersonFriends,
    MessageContent,
    MessageCreator,
    MessageForum,
    MessageReplies,
}

/// Which id buffer a short read kind draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Chain {
    Person,
    Message,
}

impl ShortReadKind {
    /// Person chain kinds, in first-factory priority order.
    pub const PERSON_CHAIN: [ShortReadKind; 3] = [
        ShortReadKind::PersonProfile,
        ShortReadKind::PersonPosts,
        ShortReadKind::PersonFriends,
    ];

    /// Message chain kinds, in first-factory priority order.
    pub const MESSAGE_CHAIN: [ShortReadKind; 4] = [
        ShortReadKind::MessageContent,
        ShortReadKind::MessageCreator,
        ShortReadKind::MessageForum,
        ShortReadKind::MessageReplies,
    ];

    pub const ALL: [ShortReadKind; 7] = [
        ShortReadKind::PersonProfile,
        ShortReadKind::PersonPosts,
        ShortReadKind::PersonFriends,
        ShortReadKind::MessageContent,
        ShortReadKind::MessageCreator,
        ShortReadKind::MessageForum,
        ShortReadKind::MessageReplies,
    ];

    pub fn chain(self) -> Chain {
        match self {
            ShortReadKind::PersonProfile
            | ShortReadKind::PersonPosts
            | ShortReadKind::PersonFriends => Chain::Person,
            ShortReadKind::MessageContent
            | ShortReadKind::MessageCreator
            | ShortReadKind::MessageForum
            | ShortReadKind::MessageReplies => Chain::Message,
        }
    }
}

impl fmt::Display for ShortReadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ShortReadKind::PersonProfile => "PersonProfile",
            ShortReadKind::PersonPosts => "PersonPosts",
            ShortReadKind::PersonFriends => "PersonFriends",
            ShortReadKind::MessageContent => "MessageContent",
            ShortReadKind::MessageCreator => "MessageCreator",
            ShortReadKind::MessageForum => "MessageForum",
            ShortReadKind::MessageReplies => "MessageReplies",
        };
        f.write_str(name)
    }
}
