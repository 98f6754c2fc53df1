use crate::alert::Alert;
use crate::graph::Graph;
use crate::{SegmentId, TrainId};
use slotmap::SecondaryMap;
use smallvec::SmallVec;

/// The trains occupying a single segment.
type Occupants = SmallVec<[TrainId; 2]>;

/// Records which trains occupy which segments.
///
/// The ledger is passive: it never refuses a reservation. Whether a train may
/// enter a segment is decided by the caller beforehand via [Self::can_enter],
/// and any over-capacity occupancy is reported by [Self::conflicts].
#[derive(Clone, Debug, Default)]
pub struct OccupancyLedger {
    entries: SecondaryMap<SegmentId, Occupants>,
}

impl OccupancyLedger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Default::default()
    }

    /// Records that `train` occupies `segment`. Reserving twice has no further effect.
    pub fn reserve(&mut self, segment: SegmentId, train: TrainId) {
        let Some(entry) = self.entries.entry(segment) else {
            return;
        };
        let occupants = entry.or_insert_with(Occupants::new);
        if !occupants.contains(&train) {
            occupants.push(train);
        }
    }

    /// Records that `train` no longer occupies `segment`.
    /// Releasing a train that is not recorded is a no-op.
    pub fn release(&mut self, segment: SegmentId, train: TrainId) {
        if let Some(occupants) = self.entries.get_mut(segment) {
            occupants.retain(|id| *id != train);
        }
    }

    /// The number of trains occupying `segment`.
    pub fn occupancy_count(&self, segment: SegmentId) -> usize {
        self.entries.get(segment).map_or(0, |occupants| occupants.len())
    }

    /// The trains occupying `segment`.
    pub fn occupants(&self, segment: SegmentId) -> &[TrainId] {
        self.entries
            .get(segment)
            .map(|occupants| occupants.as_slice())
            .unwrap_or(&[])
    }

    /// Whether `train` is recorded on `segment`.
    pub fn is_reserved(&self, segment: SegmentId, train: TrainId) -> bool {
        self.occupants(segment).contains(&train)
    }

    /// The segment `train` is recorded on, if any.
    pub fn segment_of(&self, train: TrainId) -> Option<SegmentId> {
        self.entries
            .iter()
            .find(|(_, occupants)| occupants.contains(&train))
            .map(|(segment, _)| segment)
    }

    /// Whether one more train may enter a segment with the given capacity.
    pub fn can_enter(&self, segment: SegmentId, capacity: usize) -> bool {
        self.occupancy_count(segment) < capacity
    }

    /// Whether `train` may remain on or enter `segment`, counting only the
    /// other trains recorded there.
    pub fn admits(&self, segment: SegmentId, capacity: usize, train: TrainId) -> bool {
        let others = self
            .occupants(segment)
            .iter()
            .filter(|id| **id != train)
            .count();
        others < capacity
    }

    /// The number of segments with at least one occupant.
    pub fn occupied_segments(&self) -> usize {
        self.entries.values().filter(|o| !o.is_empty()).count()
    }

    /// Emits a high severity alert for every segment holding more trains than its capacity.
    pub fn conflicts(&self, graph: &Graph) -> Vec<Alert> {
        graph
            .iter_segments()
            .filter(|segment| self.occupancy_count(segment.id()) > segment.capacity())
            .map(|segment| {
                log::warn!(
                    "segment {} holds {} trains with capacity {}",
                    segment.code(),
                    self.occupancy_count(segment.id()),
                    segment.capacity()
                );
                Alert::high(format!("Conflict detected on {}", segment.code()))
            })
            .collect()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::alert::Severity;
    use crate::graph::{Directionality, NodeKind};
    use crate::scenario::{NodeAttributes, SegmentAttributes};
    use rand::{Rng, SeedableRng};
    use slotmap::SlotMap;

    fn single_segment() -> (Graph, SegmentId) {
        let nodes = ["A", "B"].map(|id| NodeAttributes {
            id: id.into(),
            name: id.into(),
            kind: NodeKind::Station,
            position: None,
        });
        let segment = SegmentAttributes {
            id: "s".into(),
            from: "A".into(),
            to: "B".into(),
            length: 4.0,
            speed_limit: 80.0,
            direction: Directionality::Bidirectional,
            capacity: 1,
        };
        let graph = Graph::build(&nodes, &[segment]).unwrap();
        let id = graph.segment_by_code("s").unwrap();
        (graph, id)
    }

    fn train_ids(count: usize) -> Vec<TrainId> {
        let mut keys = SlotMap::<TrainId, ()>::with_key();
        (0..count).map(|_| keys.insert(())).collect()
    }

    #[test]
    fn reserve_is_idempotent() {
        let (_, s) = single_segment();
        let t = train_ids(1)[0];
        let mut ledger = OccupancyLedger::new();
        ledger.reserve(s, t);
        ledger.reserve(s, t);
        assert_eq!(ledger.occupancy_count(s), 1);
        assert!(ledger.is_reserved(s, t));
        assert_eq!(ledger.segment_of(t), Some(s));
    }

    #[test]
    fn release_is_idempotent() {
        let (_, s) = single_segment();
        let ids = train_ids(2);
        let mut ledger = OccupancyLedger::new();
        ledger.reserve(s, ids[0]);
        ledger.reserve(s, ids[1]);
        ledger.release(s, ids[0]);
        let once = ledger.occupants(s).to_vec();
        ledger.release(s, ids[0]);
        assert_eq!(ledger.occupants(s), once.as_slice());
        assert_eq!(ledger.occupancy_count(s), 1);

        ledger.release(s, ids[1]);
        ledger.release(s, ids[1]);
        assert_eq!(ledger.occupancy_count(s), 0);
        assert_eq!(ledger.occupied_segments(), 0);
    }

    #[test]
    fn release_of_unknown_segment_is_noop() {
        let t = train_ids(1)[0];
        let mut ledger = OccupancyLedger::new();
        ledger.release(SegmentId::default(), t);
        assert_eq!(ledger.occupancy_count(SegmentId::default()), 0);
    }

    #[test]
    fn count_matches_reservations() {
        let (_, s) = single_segment();
        let ids = train_ids(6);
        let mut ledger = OccupancyLedger::new();
        let mut expected = vec![false; ids.len()];
        let mut rng = rand::rngs::StdRng::seed_from_u64(7);
        for _ in 0..500 {
            let idx = rng.gen_range(0..ids.len());
            if rng.gen_bool(0.5) {
                ledger.reserve(s, ids[idx]);
                expected[idx] = true;
            } else {
                ledger.release(s, ids[idx]);
                expected[idx] = false;
            }
            let count = expected.iter().filter(|r| **r).count();
            assert_eq!(ledger.occupancy_count(s), count);
        }
    }

    #[test]
    fn admission() {
        let (_, s) = single_segment();
        let ids = train_ids(2);
        let mut ledger = OccupancyLedger::new();
        assert!(ledger.can_enter(s, 1));
        ledger.reserve(s, ids[0]);
        assert!(!ledger.can_enter(s, 1));
        assert!(ledger.admits(s, 1, ids[0]));
        assert!(!ledger.admits(s, 1, ids[1]));
    }

    #[test]
    fn over_capacity_raises_one_alert() {
        let (graph, s) = single_segment();
        let ids = train_ids(2);
        let mut ledger = OccupancyLedger::new();
        ledger.reserve(s, ids[0]);
        assert!(ledger.conflicts(&graph).is_empty());

        ledger.reserve(s, ids[1]);
        let alerts = ledger.conflicts(&graph);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].severity, Severity::High);
        assert_eq!(alerts[0].message, "Conflict detected on s");
    }
}
