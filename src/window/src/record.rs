use marker::Marker;

/// A source stream item the sliding windows know how to align on.
///
/// Both window types only ever need a record's [`Marker`] to decide where
/// it belongs; everything else (the emission payload) rides along
/// opaquely.
pub trait WindowRecord {
    fn marker(&self) -> &Marker;
}
