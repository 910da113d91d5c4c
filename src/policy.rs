/* src/policy.rs */

use alloc::string::{String, ToString};
use core::fmt;
use core::str::FromStr;

use crate::PolicyError;

/// Closed interval `[min, max]` of non-negative integers.
///
/// Written as `"N"` for a fixed value or `"MIN-MAX"` for a range.
///
/// ```
/// let iv: tlsfrag::Interval = "10-20".parse().unwrap();
/// assert_eq!((iv.min(), iv.max()), (10, 20));
/// assert!("20-10".parse::<tlsfrag::Interval>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
	feature = "serde",
	derive(serde::Serialize, serde::Deserialize),
	serde(try_from = "String", into = "String")
)]
pub struct Interval {
	min: u64,
	max: u64,
}

impl Interval {
	/// Build an interval.
	///
	/// # Errors
	///
	/// Returns [`PolicyError::InvalidRange`] when `min > max`.
	pub fn new(min: u64, max: u64) -> Result<Self, PolicyError> {
		if min > max {
			return Err(PolicyError::InvalidRange { min, max });
		}
		Ok(Self { min, max })
	}

	/// Interval holding a single value.
	#[must_use]
	pub const fn fixed(value: u64) -> Self {
		Self {
			min: value,
			max: value,
		}
	}

	/// Lower bound.
	#[must_use]
	pub const fn min(&self) -> u64 {
		self.min
	}

	/// Upper bound.
	#[must_use]
	pub const fn max(&self) -> u64 {
		self.max
	}

	/// Whether `min == max`.
	#[must_use]
	pub const fn is_fixed(&self) -> bool {
		self.min == self.max
	}

	/// Draw a value uniformly from the interval.
	#[cfg(feature = "std")]
	pub(crate) fn sample<G: rand::Rng + ?Sized>(&self, rng: &mut G) -> u64 {
		if self.is_fixed() {
			self.min
		} else {
			rng.random_range(self.min..=self.max)
		}
	}
}

impl fmt::Display for Interval {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		if self.is_fixed() {
			write!(f, "{}", self.min)
		} else {
			write!(f, "{}-{}", self.min, self.max)
		}
	}
}

impl FromStr for Interval {
	type Err = PolicyError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let malformed = || PolicyError::Malformed(s.to_owned());
		let number = |part: &str| part.trim().parse::<u64>().map_err(|_| malformed());
		match s.split_once('-') {
			Some((min, max)) => Self::new(number(min)?, number(max)?),
			None => Ok(Self::fixed(number(s)?)),
		}
	}
}

impl TryFrom<String> for Interval {
	type Error = PolicyError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		value.parse()
	}
}

impl From<Interval> for String {
	fn from(value: Interval) -> Self {
		value.to_string()
	}
}

/// How the first ClientHello is cut up.
///
/// The bytes before the SNI hostname, the hostname itself and the bytes
/// after it are each chopped into fragments whose sizes are drawn from
/// their own interval. A delay drawn from `delay_ms` follows every
/// fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FragmentationPolicy {
	before_sni: Interval,
	sni: Interval,
	after_sni: Interval,
	delay_ms: Interval,
}

impl FragmentationPolicy {
	/// Build a policy from three fragment size intervals and a delay
	/// interval in milliseconds.
	///
	/// A size drawn as zero still sends one byte.
	#[must_use]
	pub const fn new(
		before_sni: Interval,
		sni: Interval,
		after_sni: Interval,
		delay_ms: Interval,
	) -> Self {
		Self {
			before_sni,
			sni,
			after_sni,
			delay_ms,
		}
	}

	/// Fragment sizes for the bytes ahead of the hostname.
	#[must_use]
	pub const fn before_sni(&self) -> Interval {
		self.before_sni
	}

	/// Fragment sizes for the hostname bytes.
	#[must_use]
	pub const fn sni(&self) -> Interval {
		self.sni
	}

	/// Fragment sizes for the bytes after the hostname.
	#[must_use]
	pub const fn after_sni(&self) -> Interval {
		self.after_sni
	}

	/// Pause after each fragment, in milliseconds.
	#[must_use]
	pub const fn delay_ms(&self) -> Interval {
		self.delay_ms
	}

	/// Same policy with a different delay interval.
	#[must_use]
	pub fn with_delay_ms(mut self, delay_ms: Interval) -> Self {
		self.delay_ms = delay_ms;
		self
	}
}

impl Default for FragmentationPolicy {
	/// Everything up to the hostname in one write, then one or two bytes per
	/// write with 10 to 20 ms between them.
	fn default() -> Self {
		Self {
			before_sni: Interval::fixed(2000),
			sni: Interval { min: 1, max: 2 },
			after_sni: Interval { min: 1, max: 2 },
			delay_ms: Interval { min: 10, max: 20 },
		}
	}
}
