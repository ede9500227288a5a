/// Identifier for a particle in a [`crate::particles::ParticleState`].
///
/// This is an index into the state's parallel arrays. It stays stable for
/// the whole run: respawning overwrites the slot, it never moves it.
pub type ParticleId = usize;
