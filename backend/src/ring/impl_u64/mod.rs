pub mod rescaling_rns;
pub mod ring;
pub mod ring_rns;
pub mod sampling;
