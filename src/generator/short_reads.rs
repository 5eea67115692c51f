//! Derivation of dependent short read operations from parent results.
//!
//! Given a parent operation and its captured result, the generator decides
//! whether to emit at most one derived short read. Long read parents enter
//! one of two independent chains (person-derived or message-derived) through
//! a coin-toss-gated entry factory, with round-robin arbitration between the
//! chains when both are enabled. The continuation probability is owned by
//! the caller and degraded between attempts via [`ChildOperationGenerator::update_state`].

use std::collections::HashMap;
use std::sync::Arc;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::buffers::IdBuffer;
use crate::config::ShortReadConfig;
use crate::core::{DriverError, Result};
use crate::operation::{
    Chain, Operation, OperationCatalogue, OperationClass, OperationResult, ShortReadKind,
    TimeMilli,
};

/// Fixed seed for the coin toss draws, so runs are reproducible.
const COIN_TOSS_SEED: u64 = 42;

/// Stateful decision engine deriving zero-or-one short read per parent
/// (operation, result) pair.
///
/// Single-threaded by design: the id buffers and the caller-held probability
/// state are mutated in place, so concurrent callers must serialize access
/// externally.
pub struct ChildOperationGenerator {
    initial_probability: f64,
    probability_degradation_factor: f64,
    interleave_as_milli: u64,
    catalogue: Arc<dyn OperationCatalogue>,
    person_id_buffer: Arc<IdBuffer>,
    message_id_buffer: Arc<IdBuffer>,
    long_read_factory: ShortReadFactory,
    short_read_factories: HashMap<ShortReadKind, ShortReadFactory>,
}

impl ChildOperationGenerator {
    pub fn new(
        config: ShortReadConfig,
        catalogue: Arc<dyn OperationCatalogue>,
        person_id_buffer: Arc<IdBuffer>,
        message_id_buffer: Arc<IdBuffer>,
    ) -> Result<Self> {
        config.validate().map_err(DriverError::Config)?;
        let (long_read_factory, short_read_factories) = build_factories(&config);
        Ok(Self {
            initial_probability: config.initial_probability,
            probability_degradation_factor: config.probability_degradation_factor,
            interleave_as_milli: config.interleave_as_milli(),
            catalogue,
            person_id_buffer,
            message_id_buffer,
            long_read_factory,
            short_read_factories,
        })
    }

    /// Continuation probability at the start of every new chain.
    pub fn initial_state(&self) -> f64 {
        self.initial_probability
    }

    /// Probability decay, applied by the caller between derivation attempts.
    /// Never clamped; a non-positive state guarantees rejection thereafter.
    pub fn update_state(&self, previous_state: f64) -> f64 {
        previous_state - self.probability_degradation_factor
    }

    /// Effective parent-to-child delay in milliseconds.
    pub fn interleave_as_milli(&self) -> u64 {
        self.interleave_as_milli
    }

    /// Observe one parent (operation, result) pair and derive at most one
    /// dependent short read from it.
    ///
    /// Identifier extraction happens first and unconditionally: every person
    /// and message id carried by the result lands in the shared buffers even
    /// when no child operation is produced. `Ok(None)` is the normal "no
    /// child" outcome (failed coin toss, empty buffer, ineligible parent);
    /// the only error is dispatching a disabled short read kind.
    pub fn next_operation(
        &mut self,
        state: f64,
        parent: &dyn Operation,
        result: &dyn OperationResult,
    ) -> Result<Option<Box<dyn Operation>>> {
        self.person_id_buffer.extend(result.person_ids());
        self.message_id_buffer.extend(result.message_ids());

        // Parents have been scheduled by the time their results are observed.
        let parent_start_time = parent.scheduled_start_time().unwrap_or(0);
        let ctx = FactoryContext {
            person_ids: self.person_id_buffer.as_ref(),
            message_ids: self.message_id_buffer.as_ref(),
            catalogue: self.catalogue.as_ref(),
            interleave_as_milli: self.interleave_as_milli,
        };

        match parent.class() {
            OperationClass::LongRead => {
                self.long_read_factory.create(&ctx, parent_start_time, state)
            }
            OperationClass::ShortRead(kind) => self
                .short_read_factories
                .get_mut(&kind)
                .expect("factory table covers every short read kind")
                .create(&ctx, parent_start_time, state),
            OperationClass::Update => Ok(None),
        }
    }
}

struct FactoryContext<'a> {
    person_ids: &'a IdBuffer,
    message_ids: &'a IdBuffer,
    catalogue: &'a dyn OperationCatalogue,
    interleave_as_milli: u64,
}

/// One slot of the derivation dispatch table.
enum ShortReadFactory {
    /// Produces nothing; the slot has no dependent wiring.
    NoOp,
    /// Slot for a kind this run disabled; dispatching it is a wiring defect.
    Disabled(ShortReadKind),
    /// Polls one id from the kind's chain buffer and builds the operation.
    Poll(ShortReadKind),
    /// Produces the inner factory's operation only when a uniform draw falls
    /// below the current continuation probability.
    CoinToss {
        rng: ChaCha8Rng,
        inner: Box<ShortReadFactory>,
    },
    /// Alternates between the chain entry factories for fairness. The
    /// alternation state is shared across every eligible parent.
    RoundRobin {
        factories: Vec<ShortReadFactory>,
        next: usize,
    },
}

impl ShortReadFactory {
    fn create(
        &mut self,
        ctx: &FactoryContext<'_>,
        previous_start_time: TimeMilli,
        state: f64,
    ) -> Result<Option<Box<dyn Operation>>> {
        match self {
            ShortReadFactory::NoOp => Ok(None),
            ShortReadFactory::Disabled(kind) => Err(DriverError::DisabledShortRead(*kind)),
            ShortReadFactory::Poll(kind) => {
                let buffer = match kind.chain() {
                    Chain::Person => ctx.person_ids,
                    Chain::Message => ctx.message_ids,
                };
                match buffer.poll() {
                    None => Ok(None),
                    Some(id) => {
                        let mut operation = ctx.catalogue.create_short_read(*kind, id);
                        operation.set_scheduled_start_time(
                            previous_start_time + ctx.interleave_as_milli as TimeMilli,
                        );
                        Ok(Some(operation))
                    }
                }
            }
            ShortReadFactory::CoinToss { rng, inner } => {
                if state > rng.gen_range(0.0..1.0) {
                    inner.create(ctx, previous_start_time, state)
                } else {
                    Ok(None)
                }
            }
            ShortReadFactory::RoundRobin { factories, next } => {
                let index = *next;
                *next = (index + 1) % factories.len();
                factories[index].create(ctx, previous_start_time, state)
            }
        }
    }
}

/// Build the dispatch table.
///
/// Precedence: disabled kinds get an error slot; each chain's entry factory
/// is the first enabled kind in chain priority order, coin-toss wrapped;
/// long read parents get the round-robin of both entries (or the single
/// available one, or nothing); update parents and enabled short read parents
/// produce no children. Chaining beyond the first derived short read is a
/// follow-on feature, so executed short reads only feed the id buffers.
fn build_factories(
    config: &ShortReadConfig,
) -> (ShortReadFactory, HashMap<ShortReadKind, ShortReadFactory>) {
    let first_person = first_enabled(&ShortReadKind::PERSON_CHAIN, config).map(|kind| {
        ShortReadFactory::CoinToss {
            rng: ChaCha8Rng::seed_from_u64(COIN_TOSS_SEED),
            inner: Box::new(ShortReadFactory::Poll(kind)),
        }
    });
    let first_message = first_enabled(&ShortReadKind::MESSAGE_CHAIN, config).map(|kind| {
        ShortReadFactory::CoinToss {
            rng: ChaCha8Rng::seed_from_u64(COIN_TOSS_SEED + 1),
            inner: Box::new(ShortReadFactory::Poll(kind)),
        }
    });

    let long_read_factory = match (first_person, first_message) {
        (Some(person), Some(message)) => ShortReadFactory::RoundRobin {
            factories: vec![person, message],
            next: 0,
        },
        (Some(person), None) => person,
        (None, Some(message)) => message,
        (None, None) => ShortReadFactory::NoOp,
    };

    let mut short_read_factories = HashMap::new();
    for kind in ShortReadKind::ALL {
        let factory = if config.enabled.contains(&kind) {
            ShortReadFactory::NoOp
        } else {
            ShortReadFactory::Disabled(kind)
        };
        short_read_factories.insert(kind, factory);
    }

    (long_read_factory, short_read_factories)
}

fn first_enabled(chain: &[ShortReadKind], config: &ShortReadConfig) -> Option<ShortReadKind> {
    chain
        .iter()
        .copied()
        .find(|kind| config.enabled.contains(kind))
}
