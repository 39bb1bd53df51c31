use crate::catalog::Category;
use crate::player::{PlayerCounters, Position};

/// A counter that carries a scoring weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stat {
    AttackPoint,
    AttackSuccess,
    AttackFail,
    ServicePoint,
    ServiceSuccess,
    ServiceFail,
    ReceptionSuccess,
    ReceptionFail,
    BlockPoint,
    BlockSuccess,
    BlockFail,
    PassesFail,
    Faults,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatKind {
    Point(Category),
    Success(Category),
    Fail(Category),
    Scalar,
}

impl Stat {
    pub fn kind(&self) -> StatKind {
        use Category::*;
        match self {
            Stat::AttackPoint => StatKind::Point(Attack),
            Stat::AttackSuccess => StatKind::Success(Attack),
            Stat::AttackFail => StatKind::Fail(Attack),
            Stat::ServicePoint => StatKind::Point(Service),
            Stat::ServiceSuccess => StatKind::Success(Service),
            Stat::ServiceFail => StatKind::Fail(Service),
            Stat::ReceptionSuccess => StatKind::Success(Reception),
            Stat::ReceptionFail => StatKind::Fail(Reception),
            Stat::BlockPoint => StatKind::Point(Block),
            Stat::BlockSuccess => StatKind::Success(Block),
            Stat::BlockFail => StatKind::Fail(Block),
            Stat::PassesFail | Stat::Faults => StatKind::Scalar,
        }
    }

    /// Current value of the counter. Successes include points, fails are attempts
    /// that did not succeed.
    pub fn value(&self, counters: &PlayerCounters) -> u32 {
        match self.kind() {
            StatKind::Point(category) => counters.category(category).point(),
            StatKind::Success(category) => counters.category(category).success(),
            StatKind::Fail(category) => counters.category(category).fail(),
            StatKind::Scalar if *self == Stat::PassesFail => counters.passes_fail,
            StatKind::Scalar => counters.faults,
        }
    }
}

const LIBERO: &[(Stat, f64)] = &[
    (Stat::ReceptionSuccess, 1.0),
    (Stat::ReceptionFail, -0.5),
    (Stat::PassesFail, -0.5),
    (Stat::Faults, -1.0),
];

const OUTSIDE_HITTER: &[(Stat, f64)] = &[
    (Stat::AttackPoint, 3.0),
    (Stat::AttackSuccess, 1.0),
    (Stat::AttackFail, -1.0),
    (Stat::BlockPoint, 2.0),
    (Stat::BlockSuccess, 1.0),
    (Stat::BlockFail, -0.5),
    (Stat::ServicePoint, 2.5),
    (Stat::ServiceSuccess, 1.0),
    (Stat::ServiceFail, -0.5),
    (Stat::ReceptionSuccess, 0.5),
    (Stat::ReceptionFail, -0.5),
    (Stat::PassesFail, -0.5),
    (Stat::Faults, -1.0),
];

const OPPOSITE: &[(Stat, f64)] = &[
    (Stat::AttackPoint, 3.0),
    (Stat::AttackSuccess, 1.0),
    (Stat::AttackFail, -1.0),
    (Stat::BlockPoint, 2.0),
    (Stat::BlockSuccess, 1.0),
    (Stat::BlockFail, -0.5),
    (Stat::ServicePoint, 2.5),
    (Stat::ServiceSuccess, 1.0),
    (Stat::ServiceFail, -0.5),
    (Stat::PassesFail, -0.5),
    (Stat::Faults, -1.0),
];

const CENTRAL: &[(Stat, f64)] = &[
    (Stat::BlockPoint, 3.0),
    (Stat::BlockSuccess, 1.0),
    (Stat::BlockFail, -0.5),
    (Stat::AttackPoint, 2.0),
    (Stat::AttackSuccess, 1.0),
    (Stat::AttackFail, -1.0),
    (Stat::ServicePoint, 1.5),
    (Stat::ServiceSuccess, 1.0),
    (Stat::ServiceFail, -0.5),
    (Stat::PassesFail, -0.5),
    (Stat::Faults, -1.0),
];

const SETTER: &[(Stat, f64)] = &[
    (Stat::PassesFail, -0.5),
    (Stat::BlockSuccess, 1.0),
    (Stat::BlockFail, -0.5),
    (Stat::Faults, -1.0),
];

pub fn weights_for(position: Position) -> &'static [(Stat, f64)] {
    match position {
        Position::Libero => LIBERO,
        Position::OutsideHitter => OUTSIDE_HITTER,
        Position::Opposite => OPPOSITE,
        Position::Central => CENTRAL,
        Position::Setter => SETTER,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Outcome;

    #[test]
    fn weights_are_signed_by_stat_kind() {
        for position in [
            Position::Libero,
            Position::OutsideHitter,
            Position::Opposite,
            Position::Central,
            Position::Setter,
        ] {
            for (stat, weight) in weights_for(position) {
                match stat.kind() {
                    StatKind::Point(_) | StatKind::Success(_) => assert!(*weight > 0.0),
                    StatKind::Fail(_) | StatKind::Scalar => assert!(*weight < 0.0),
                }
            }
        }
    }

    #[test]
    fn stat_values_read_the_matching_counters() {
        let mut counters = PlayerCounters::default();
        counters.attack.record(Outcome::Point);
        counters.attack.record(Outcome::Success);
        counters.attack.record(Outcome::Fail);
        counters.passes_fail = 2;
        counters.faults = 5;

        assert_eq!(Stat::AttackPoint.value(&counters), 1);
        assert_eq!(Stat::AttackSuccess.value(&counters), 2);
        assert_eq!(Stat::AttackFail.value(&counters), 1);
        assert_eq!(Stat::PassesFail.value(&counters), 2);
        assert_eq!(Stat::Faults.value(&counters), 5);
        assert_eq!(Stat::BlockFail.value(&counters), 0);
    }
}
