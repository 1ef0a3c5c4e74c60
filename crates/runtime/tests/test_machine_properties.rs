//! Behavioural properties of the machine
//!
//! These run whole operation sequences through the public API and check the
//! invariants that hold across every operation.

use pang_runtime::{Block, Machine, MachineConfig, Op, PangError, TaggedValue};

/// Small deterministic generator so sequences are reproducible
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.0 >> 33
    }

    fn op(&mut self) -> Op {
        match self.next() % 10 {
            0 | 1 => Op::PushInt(self.next() as i64 % 64 - 8),
            2 => Op::PushStr("pang".chars().take(self.next() as usize % 5).collect()),
            3 => Op::Purge((self.next() % 3) as u16),
            4 => Op::Swap,
            5 => Op::Quote,
            6 => Op::Apply,
            7 => Op::Add,
            8 => Op::Sub,
            _ => Op::Free,
        }
    }
}

fn assert_sentinel(m: &Machine) {
    assert_eq!(m.stack()[0], 0);
    assert!(m.arena()[0].is_null_int());
    assert!(m.arena().free_list().iter().all(|b| b.start != 0));
}

fn assert_free_list_disjoint(m: &Machine) {
    let blocks = m.arena().free_list();
    for (i, a) in blocks.iter().enumerate() {
        for b in &blocks[i + 1..] {
            assert!(!a.overlaps(b), "free blocks {:?} and {:?} overlap", a, b);
        }
    }
}

/// Faults a well-formed program can run into, by operation
fn assert_expected_fault(op: &Op, err: &PangError) {
    let expected = match op {
        Op::PushInt(_) | Op::PushStr(_) => matches!(err, PangError::ArenaExhausted { .. }),
        Op::Purge(_) | Op::Add | Op::Sub => matches!(
            err,
            PangError::NullPurge { .. } | PangError::DoubleFree { .. }
        ),
        Op::Swap => matches!(err, PangError::NullMove { .. }),
        Op::Quote => matches!(err, PangError::NullQuote | PangError::QuotePointer { .. }),
        Op::Apply => matches!(
            err,
            PangError::ApplyNonPointer { .. }
                | PangError::NullApply { .. }
                | PangError::InvalidAddress { .. }
        ),
        Op::Free => matches!(
            err,
            PangError::ApplyNonPointer { .. }
                | PangError::NullApply { .. }
                | PangError::InvalidAddress { .. }
                | PangError::DoubleFree { .. }
        ),
    };
    assert!(expected, "`{}` raised unexpected {:?}", op, err);
}

/// Every operand address is distinct and none of them is on the free list
fn assert_live_addresses_unique(m: &Machine) {
    let operands = &m.stack()[1..];
    for (i, addr) in operands.iter().enumerate() {
        assert!(
            !operands[i + 1..].contains(addr),
            "address {} is on the stack twice: {:?}",
            addr,
            m.stack()
        );
        assert!(
            !m.arena().free_list().iter().any(|b| b.contains(*addr)),
            "live address {} is on the free list {:?}",
            addr,
            m.arena().free_list()
        );
    }
}

#[test]
fn test_sentinel_invariance_over_random_programs() {
    for (seed, config) in [
        (1, MachineConfig::default()),
        (2, MachineConfig::compat()),
        (3, MachineConfig::default()),
        (4, MachineConfig::compat()),
    ] {
        let mut rng = Lcg(seed);
        let mut m = Machine::with_config(config);
        for _ in 0..2000 {
            let op = rng.op();
            if let Err(err) = m.execute(&op) {
                assert_expected_fault(&op, &err);
                assert_sentinel(&m);
                m = Machine::with_config(config);
            }
            assert_sentinel(&m);
            assert!(!m.stack().is_empty());
        }
    }
}

#[test]
fn test_free_list_stays_disjoint() {
    let mut rng = Lcg(99);
    let mut m = Machine::new();
    for _ in 0..2000 {
        let op = rng.op();
        if let Err(err) = m.execute(&op) {
            assert_expected_fault(&op, &err);
            m = Machine::new();
        }
        assert_free_list_disjoint(&m);
    }
}

#[test]
fn test_aliased_free_is_safe_under_both_policies() {
    // Each program frees a string through a quoted integer that points into
    // it, then drops the original handle
    let programs: [&[Op]; 3] = [
        &[
            Op::PushStr("ab".into()),
            Op::PushInt(1),
            Op::Quote,
            Op::Free,
            Op::Purge(1),
            Op::PushStr("x".into()),
            Op::Swap,
            Op::Purge(1),
            Op::PushInt(42),
            Op::PushInt(43),
        ],
        &[
            Op::PushStr("ab".into()),
            Op::PushInt(1),
            Op::Quote,
            Op::Free,
            Op::Purge(2),
            Op::PushStr("cd".into()),
            Op::PushInt(7),
        ],
        &[
            Op::PushStr("abcd".into()),
            Op::PushInt(3),
            Op::Quote,
            Op::Free,
            Op::Purge(2),
            Op::PushStr("zz".into()),
            Op::PushInt(5),
        ],
    ];

    for config in [MachineConfig::default(), MachineConfig::compat()] {
        for program in programs {
            let mut m = Machine::with_config(config);
            for op in program {
                m.execute(op)
                    .unwrap_or_else(|e| panic!("{:?}: `{}` failed: {}", config, op, e));
                assert_live_addresses_unique(&m);
                assert_free_list_disjoint(&m);
            }
            assert_eq!(m.fault(), None);
        }
    }

    // The string that took over the freed characters is still intact
    let mut m = Machine::new();
    m.run(programs[0]).unwrap();
    assert_eq!(m.stack(), &[0, 3, 4, 5]);
    assert_eq!(m.arena()[3], TaggedValue::ptr(1));
    assert_eq!(m.string_at(1).as_deref(), Some("x"));
}

#[test]
fn test_push_read_round_trip() {
    let mut m = Machine::new();
    for v in [0, 1, -1, 42, i64::MIN, i64::MAX] {
        m.push_int(v).unwrap();
        let top = m.at(0, true).unwrap();
        assert!(!top.is_null);
        assert!(!top.is_ptr);
        assert_eq!(top.real, v);
    }
}

#[test]
fn test_string_round_trip() {
    let mut m = Machine::new();
    m.push_str("hi").unwrap();
    let start = m.top().real as u16;
    assert_eq!(m.arena()[start + 2], TaggedValue::null_ptr());

    m.apply().unwrap();
    assert_eq!(m.top(), TaggedValue::int('h' as i64));
}

#[test]
fn test_purge_zero_resets_regardless_of_history() {
    let mut m = Machine::new();
    m.run(&[
        Op::PushStr("hello".into()),
        Op::Free,
        Op::PushInt(3),
        Op::PushInt(4),
        Op::Add,
        Op::Purge(1),
        Op::PushStr("abc".into()),
    ])
    .unwrap();
    assert!(m.arena().bump_cursor() > 1);

    m.purge(0).unwrap();
    assert_eq!(m.stack(), &[0]);
    assert!(m.arena().free_list().is_empty());
    assert_eq!(m.arena().bump_cursor(), 1);
}

#[test]
fn test_arithmetic_consumes_one_slot() {
    let mut m = Machine::new();
    m.push_int(3).unwrap();
    m.push_int(4).unwrap();
    let before = m.stats().free_slots;
    m.add().unwrap();
    assert_eq!(m.depth(), 1);
    assert_eq!(m.top().real, 7);
    assert_eq!(m.stats().free_slots, before + 1);
}

#[test]
fn test_swap_underflow_never_mutates() {
    let mut m = Machine::new();
    assert!(matches!(m.swap(), Err(PangError::NullMove { .. })));
    assert_eq!(m.stack(), &[0]);

    let mut m = Machine::new();
    m.push_int(8).unwrap();
    let err = m.swap().unwrap_err();
    assert_eq!(err.exit_code(), 0x14);
    assert_eq!(m.stack().len(), 2);
}

#[test]
fn test_double_quote_rejected() {
    let mut m = Machine::new();
    m.push_int(9).unwrap();
    m.quote().unwrap();
    let before = m.top();
    let err = m.quote().unwrap_err();
    assert_eq!(err.exit_code(), 0x20);
    assert_eq!(m.top(), before);
}

#[test]
fn test_quote_apply_self_reference() {
    // The first integer lands at address 1, so quoting 1 names its own cell
    let mut m = Machine::new();
    m.push_int(1).unwrap();
    m.quote().unwrap();
    m.apply().unwrap();
    assert_eq!(m.top().real, 1);
}

#[test]
fn test_no_usable_state_after_fault() {
    let mut m = Machine::new();
    let err = m.run(&[Op::PushInt(1), Op::Apply]).unwrap_err();
    let code = err.exit_code();
    for op in [Op::PushInt(2), Op::Purge(0), Op::Swap, Op::Add] {
        assert_eq!(m.execute(&op), Err(PangError::Halted { code }));
    }
    assert_eq!(m.depth(), 1);
}

#[test]
fn test_reference_demo_sequence() {
    // push "hello", free, purge 1, push "test"
    let mut m = Machine::with_config(MachineConfig::compat());
    m.run(&[
        Op::PushStr("hello".into()),
        Op::Free,
        Op::Purge(1),
        Op::PushStr("test".into()),
    ])
    .unwrap();

    assert_eq!(m.arena().free_list(), &[Block::new(7, 1)]);
    assert_eq!(m.string_at(1).as_deref(), Some("test"));
    assert_eq!(m.stack(), &[0, 6]);
    let dump = m.dump();
    assert_eq!(dump.lines().nth(2), Some("null ptr(1) "));
}
