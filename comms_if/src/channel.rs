//! # Shared Scalar Channel
//!
//! A channel holds exactly one scalar value which is shared between a single writer and any number
//! of readers. Writes overwrite the previous value, there is no queue and no backpressure, so
//! readers may miss intermediate values. Both the write and the read are a single atomic operation
//! on a 64 bit word, so a reader will always see either the old or the new value and never a torn
//! one.
//!
//! The single writer invariant is enforced by the types: [`channel`] returns one
//! [`ChannelWriter`], which cannot be cloned, and a [`ChannelReader`], which can be cloned as many
//! times as needed.
//!
//! A channel which has never been written to reads as `None`, which is distinct from a reading of
//! `0.0`.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Bit pattern stored in a channel which has not been written yet.
///
/// For both `f32` and `f64` this is a NaN payload that no finite value can produce.
const UNSET_BITS: u64 = u64::MAX;

/// Bit pattern stored when the writer publishes a non-numeric value (NaN or infinite).
const INVALID_BITS: u64 = u64::MAX - 1;

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// A scalar which can be packed into a single atomic word.
pub trait Scalar: Copy + Send + Sync + 'static {
    /// Pack the value into the low bits of a `u64`.
    fn to_word(self) -> u64;

    /// Unpack a value previously packed with [`Scalar::to_word`].
    fn from_word(word: u64) -> Self;

    /// Whether the value is a usable measurement.
    fn is_valid(self) -> bool;
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// The shared storage behind a channel.
///
/// Users should not need to interact with this directly, instead use the handles returned by
/// [`channel`].
#[derive(Debug)]
pub struct SharedScalarChannel<T> {
    word: AtomicU64,

    /// Number of writes performed so far.
    epoch: AtomicU64,

    _marker: PhantomData<fn() -> T>,
}

/// The unique writing end of a channel.
#[derive(Debug)]
pub struct ChannelWriter<T> {
    shared: Arc<SharedScalarChannel<T>>,
}

/// A reading end of a channel. Readers never write.
#[derive(Debug)]
pub struct ChannelReader<T> {
    shared: Arc<SharedScalarChannel<T>>,
}

// ------------------------------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Create a new unset channel, returning the writer and a first reader.
pub fn channel<T: Scalar>() -> (ChannelWriter<T>, ChannelReader<T>) {
    let shared = Arc::new(SharedScalarChannel {
        word: AtomicU64::new(UNSET_BITS),
        epoch: AtomicU64::new(0),
        _marker: PhantomData,
    });

    (
        ChannelWriter {
            shared: shared.clone(),
        },
        ChannelReader { shared },
    )
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Scalar for f64 {
    fn to_word(self) -> u64 {
        self.to_bits()
    }

    fn from_word(word: u64) -> Self {
        f64::from_bits(word)
    }

    fn is_valid(self) -> bool {
        self.is_finite()
    }
}

impl Scalar for f32 {
    fn to_word(self) -> u64 {
        self.to_bits() as u64
    }

    fn from_word(word: u64) -> Self {
        f32::from_bits(word as u32)
    }

    fn is_valid(self) -> bool {
        self.is_finite()
    }
}

impl<T: Scalar> ChannelWriter<T> {
    /// Publish a new value, overwriting the previous one.
    ///
    /// Non-numeric values are stored as an invalid marker, which readers see as `None`.
    pub fn write(&self, value: T) {
        let word = match value.is_valid() {
            true => value.to_word(),
            false => INVALID_BITS,
        };

        self.shared.word.store(word, Ordering::Release);
        self.shared.epoch.fetch_add(1, Ordering::AcqRel);
    }

    /// Return the channel to the unset state.
    pub fn clear(&self) {
        self.shared.word.store(UNSET_BITS, Ordering::Release);
        self.shared.epoch.fetch_add(1, Ordering::AcqRel);
    }

    /// Get a new reader for this channel.
    pub fn reader(&self) -> ChannelReader<T> {
        ChannelReader {
            shared: self.shared.clone(),
        }
    }
}

impl<T: Scalar> ChannelReader<T> {
    /// Read the latest value.
    ///
    /// Returns `None` if the channel is unset or the latest value was not a valid number. This
    /// never blocks.
    pub fn read(&self) -> Option<T> {
        match self.shared.word.load(Ordering::Acquire) {
            UNSET_BITS | INVALID_BITS => None,
            w => Some(T::from_word(w)),
        }
    }

    /// Number of writes (including clears) made to the channel.
    ///
    /// Comparing the epoch between two reads tells the reader whether the writer has published
    /// anything in between, even if the value itself did not change.
    pub fn epoch(&self) -> u64 {
        self.shared.epoch.load(Ordering::Acquire)
    }
}

impl<T> Clone for ChannelReader<T> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
        }
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
