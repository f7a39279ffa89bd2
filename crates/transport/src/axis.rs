/// Which side of the cost matrix a kernel application contracts over.
///
/// `Axis::X` sums over source samples and yields one value per target sample,
/// so it updates the target potential `g`. `Axis::Y` is the mirror image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
}
