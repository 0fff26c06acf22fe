use dice_tree::{
    basic_with, compile, verbose_with, ExprTree, Mode, NonZeroUInt, Number, RollContext,
    RollError, Roller, UInt,
};
use rand::{rngs::StdRng, SeedableRng};

/// Cycles through `faces`, reduced into range for whatever die is rolled.
struct Cycle {
    faces: Vec<UInt>,
    next: usize,
}

impl Cycle {
    fn new(faces: &[UInt]) -> Self {
        Self {
            faces: faces.to_vec(),
            next: 0,
        }
    }
}

impl Roller for Cycle {
    fn roll(&mut self, sides: NonZeroUInt) -> UInt {
        let face = self.faces[self.next % self.faces.len()];
        self.next += 1;
        (face - 1) % sides.get() + 1
    }
}

fn ctx(faces: &[UInt]) -> RollContext<Cycle> {
    RollContext::new_bounded(100, Cycle::new(faces))
}

fn run(input: &str, faces: &[UInt], expected_breakdown: &str, expected_total: Number) {
    let report = verbose_with(input, Mode::NORMAL, 0, &mut ctx(faces)).unwrap();
    assert_eq!(report.breakdown(), expected_breakdown);
    assert_eq!(report.total(), expected_total);
}

#[test]
fn test_attack_roll() {
    run("1d20+5", &[13], "[d20: 13]+5", Number::Int(18));
}

#[test]
fn test_advantage() {
    run("2d20h1+3", &[7, 15], "[d20: 15; (7)]+3", Number::Int(18));
    run("2d20l1+3", &[7, 15], "[d20: 7; (15)]+3", Number::Int(10));
}

#[test]
fn test_ability_scores() {
    run("4d6h3", &[3, 6, 1, 5], "[d6: 3, 5, 6; (1)]", Number::Int(14));
    run("4d6r1h3", &[1, 6, 3, 5, 2], "[d6: 3, 5, 6; (1, 2)]", Number::Int(14));
}

#[test]
fn test_great_weapon_fighting() {
    run("2d6R<3", &[1, 2, 1, 6, 5], "[d6: 5, 6; (1, 1, 2)]", Number::Int(11));
}

#[test]
fn test_success_count() {
    run("5d10t7", &[3, 7, 9, 10, 1], "[d10: 0, 0, 1, 1, 1; (1, 3, 7, 9, 10)]", Number::Int(3));
}

#[test]
fn test_fudge_dice() {
    run("4dF", &[1, 2, 3, 3], "[dF: -1, 0, 1, 1]", Number::Int(1));
}

#[test]
fn test_modes() {
    let roll = |mode| basic_with("2d8+1d6+2", mode, 0, &mut ctx(&[4]));
    assert_eq!(roll(Mode::NORMAL).unwrap(), Number::Int(14));
    assert_eq!(roll(Mode::MAX).unwrap(), Number::Int(24));
    assert_eq!(roll(Mode::CRIT).unwrap(), Number::Int(26));
    assert_eq!(roll(Mode::AVERAGE).unwrap(), Number::Float(14.5));
    assert_eq!(roll(Mode::CRIT | Mode::MAX).unwrap(), Number::Int(24));
    assert_eq!(
        basic_with("1d4", "maximum".parse().unwrap(), 1, &mut ctx(&[1])).unwrap(),
        Number::Int(5)
    );
}

#[test]
fn test_reroll_cached_tree() {
    let mut ctx = ctx(&[2, 5, 6, 1]);
    let mut tree = compile("1d6", 1).unwrap();
    assert_eq!(tree.evaluate(&mut ctx).unwrap(), Number::Int(3));
    assert_eq!(tree.evaluate(&mut ctx).unwrap(), Number::Int(3));
    tree.clear_values();
    assert_eq!(tree.evaluate(&mut ctx).unwrap(), Number::Int(6));
}

#[test]
fn test_critical_hit() {
    let mut ctx = ctx(&[20, 3]);
    let mut tree: ExprTree = "1d20+1d20+4".parse().unwrap();
    tree.evaluate(&mut ctx).unwrap();
    assert!(tree.is_critical());
    assert!(!tree.is_fail());

    let mut advantage: ExprTree = "2d20h1".parse().unwrap();
    advantage.evaluate(&mut RollContext::new_bounded(10, Cycle::new(&[1, 12]))).unwrap();
    assert!(!advantage.is_fail());
}

#[test]
fn test_roll_budget() {
    let mut ctx = RollContext::new_bounded(50, Cycle::new(&[1]));
    assert_eq!(
        basic_with("51d6", Mode::NORMAL, 0, &mut ctx),
        Err(RollError::TooManyRolls)
    );
    assert_eq!(basic_with("50d6", Mode::NORMAL, 0, &mut ctx).unwrap(), Number::Int(50));
    assert_eq!(
        basic_with("1d6R<2", Mode::NORMAL, 0, &mut ctx),
        Err(RollError::TooManyRolls)
    );
}

#[test]
fn test_errors() {
    let mut ctx = ctx(&[1]);
    assert!(matches!(
        basic_with("1d20+", Mode::NORMAL, 0, &mut ctx),
        Err(RollError::Parse(_))
    ));
    assert!(matches!(
        basic_with("5/0", Mode::NORMAL, 0, &mut ctx),
        Err(RollError::Value(_))
    ));
    assert!(matches!(
        basic_with("4h1", Mode::NORMAL, 0, &mut ctx),
        Err(RollError::Type(_))
    ));
    assert!(matches!(
        ExprTree::new().concat(&ExprTree::new(), dice_tree::Operator::Mul),
        Err(RollError::InputType(_))
    ));
}

#[test]
fn test_seeded_rng_is_reproducible() {
    let roll = |seed| {
        let mut ctx = RollContext::new_unbounded(StdRng::seed_from_u64(seed));
        verbose_with("8d6+2d20h1", Mode::NORMAL, 0, &mut ctx).unwrap()
    };
    assert_eq!(roll(7), roll(7));
    let total = roll(7).total();
    assert!(total >= Number::Int(9) && total <= Number::Int(68));
}
