// Copyright (c) 2017-2021 Fabian Schuiki

//! Handles to signals of a running simulation.
//!
//! The sampler does not simulate anything itself. It observes the signals of a
//! host simulation through the [`Probe`] trait, which only has to report a
//! stable name, a bit width, and the value the signal currently carries.

use crate::{
    error::{Error, Result},
    value::LogicValue,
};
use std::{cell::RefCell, fmt, rc::Rc};

/// A handle to a signal in the host simulation.
pub trait Probe {
    /// The stable name of the signal.
    fn name(&self) -> &str;

    /// The width of the signal in bits.
    fn width(&self) -> usize;

    /// The value the signal currently carries.
    fn value(&self) -> LogicValue;
}

impl<P: Probe + ?Sized> Probe for Rc<P> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn width(&self) -> usize {
        (**self).width()
    }

    fn value(&self) -> LogicValue {
        (**self).value()
    }
}

/// A shared reference to a probe.
pub type ProbeRef = Rc<dyn Probe>;

/// A signal whose value is set by whoever drives the simulation.
///
/// Clones share the same underlying value, so a harness can keep one clone to
/// drive the signal while the sampler watches another.
#[derive(Clone)]
pub struct SharedSignal {
    name: Rc<str>,
    width: usize,
    value: Rc<RefCell<LogicValue>>,
}

impl SharedSignal {
    /// Create a new signal whose bits are all unknown.
    pub fn new(name: impl Into<String>, width: usize) -> SharedSignal {
        let name: String = name.into();
        SharedSignal {
            name: name.into(),
            width,
            value: Rc::new(RefCell::new(LogicValue::unknown(width))),
        }
    }

    /// Change the signal's current value. Returns whether the value differs
    /// from the previous one. Fails if the value is not as wide as the signal.
    pub fn set(&self, value: LogicValue) -> Result<bool> {
        if value.width() != self.width {
            return Err(Error::WidthMismatch {
                name: self.name.to_string(),
                expected: self.width,
                actual: value.width(),
            });
        }
        Ok(self.replace(value))
    }

    /// Drive the signal to a resolved integer value.
    pub fn set_usize(&self, value: usize) -> bool {
        self.replace(LogicValue::from_usize(self.width, value))
    }

    fn replace(&self, value: LogicValue) -> bool {
        let mut current = self.value.borrow_mut();
        if *current != value {
            *current = value;
            true
        } else {
            false
        }
    }
}

impl Probe for SharedSignal {
    fn name(&self) -> &str {
        &self.name
    }

    fn width(&self) -> usize {
        self.width
    }

    fn value(&self) -> LogicValue {
        self.value.borrow().clone()
    }
}

impl fmt::Debug for SharedSignal {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} = {:?}", self.name, self.value.borrow())
    }
}
