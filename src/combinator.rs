//! # Typed Module Combinators
//!
//! Every stage of the vocoder is a [`Module`]: a stateful processor that
//! turns one input sample into one output sample. Stages are wired together
//! with a small set of Arrow-style combinators:
//!
//! ```text
//! (>>>):   Module a b -> Module b c -> Module a c   // then
//! fmap:    Module a b -> (b -> c)   -> Module a c   // map
//! (&&&):   Module a b -> Module a c -> Module a (b,c)  // fanout
//! ```
//!
//! The envelope follower, for example, is
//! `Rectifier.then(OnePole::new(pole)).then(Shaper::new(p))`. Because everything is
//! monomorphized the chain compiles down to a single inlined `tick`.

/// A signal processing module with typed input and output.
///
/// Modules own their memory (filter state, smoothing history, RNG state).
/// Two uses of the same design on two different signals need two instances.
///
/// ```rust
/// use vocoder::combinator::Module;
///
/// struct Gain(f64);
///
/// impl Module for Gain {
///     type In = f64;
///     type Out = f64;
///
///     fn tick(&mut self, input: f64) -> f64 {
///         input * self.0
///     }
///
///     fn reset(&mut self) {}
/// }
///
/// let mut g = Gain(2.0);
/// assert_eq!(g.tick(1.5), 3.0);
/// ```
pub trait Module: Send {
    /// Input signal type (e.g. `f64`, or `(f64, f64)` for modulator/carrier pairs)
    type In;
    /// Output signal type
    type Out;

    /// Process a single sample, advancing internal state by one time step.
    fn tick(&mut self, input: Self::In) -> Self::Out;

    /// Process a block of samples.
    ///
    /// The default implementation calls `tick` in a loop. Extra output slots
    /// beyond the input length are left untouched.
    fn process(&mut self, input: &[Self::In], output: &mut [Self::Out])
    where
        Self::In: Clone,
    {
        for (i, o) in input.iter().zip(output.iter_mut()) {
            *o = self.tick(i.clone());
        }
    }

    /// Clear internal memory, as if the module had just been built.
    fn reset(&mut self);
}

/// Extension trait providing combinator methods for all modules
pub trait ModuleExt: Module + Sized {
    /// Chain this module with another (sequential composition)
    fn then<M: Module<In = Self::Out>>(self, next: M) -> Chain<Self, M> {
        Chain {
            first: self,
            second: next,
        }
    }

    /// Transform output with a pure function
    fn map<F, U>(self, f: F) -> Map<Self, F>
    where
        F: Fn(Self::Out) -> U,
    {
        Map { module: self, f }
    }

    /// Feed the same input to two modules
    fn fanout<M: Module<In = Self::In>>(self, other: M) -> Fanout<Self, M>
    where
        Self::In: Clone,
    {
        Fanout {
            left: self,
            right: other,
        }
    }
}

impl<M: Module> ModuleExt for M {}

/// Sequential composition: processes through first module, then second
pub struct Chain<A, B> {
    pub first: A,
    pub second: B,
}

impl<A, B> Module for Chain<A, B>
where
    A: Module,
    B: Module<In = A::Out>,
{
    type In = A::In;
    type Out = B::Out;

    #[inline]
    fn tick(&mut self, input: Self::In) -> Self::Out {
        self.second.tick(self.first.tick(input))
    }

    fn reset(&mut self) {
        self.first.reset();
        self.second.reset();
    }
}

/// Output transform by a pure function
pub struct Map<M, F> {
    pub module: M,
    pub f: F,
}

impl<M, F, U> Module for Map<M, F>
where
    M: Module,
    F: Fn(M::Out) -> U + Send,
{
    type In = M::In;
    type Out = U;

    #[inline]
    fn tick(&mut self, input: Self::In) -> Self::Out {
        (self.f)(self.module.tick(input))
    }

    fn reset(&mut self) {
        self.module.reset();
    }
}

/// Fanout: one input, two independent processors
pub struct Fanout<A, B> {
    pub left: A,
    pub right: B,
}

impl<A, B> Module for Fanout<A, B>
where
    A: Module,
    B: Module<In = A::In>,
    A::In: Clone,
{
    type In = A::In;
    type Out = (A::Out, B::Out);

    #[inline]
    fn tick(&mut self, input: Self::In) -> Self::Out {
        (self.left.tick(input.clone()), self.right.tick(input))
    }

    fn reset(&mut self) {
        self.left.reset();
        self.right.reset();
    }
}
