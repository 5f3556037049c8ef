//! Integration tests for `PolyVec`.
//!
//! ## Scenario Tests
//! - `test_empty`, `test_single_value`, `test_two_values`
//! - `test_many_mixed_values`: 56 values of three sizes keep their values
//!   across every reallocation
//! - `test_try_add`: the fallible add succeeds when memory is available
//!
//! ## Property Tests
//! - `prop_values_round_trip`: any sequence of adds reads back in order
//! - `prop_sizes_match_concrete_types`: `size_at` is the size of the added type
//! - `prop_clear_resets`: clearing drops everything and keeps capacity
//!
//! ## Error Reporting Tests
//! - `test_errors_compose_with_reports`: errors convert into a
//!   `rootcause::Report` with `?` and accept extra context

use proptest::prelude::*;
use rootcause::prelude::{Report, ResultExt};

use polyvec::{
    PolyVec, PolyVecError,
    growth::{Exact, Geometric, GrowthPolicy},
    poly_element,
};

trait Shape {
    fn id(&self) -> u64;
}

struct Dot {
    id: u64,
}

struct Segment {
    id: u64,
    _ends: [f32; 4],
}

struct Polygon {
    id: u64,
    _corners: [f64; 12],
    label: String,
}

impl Shape for Dot {
    fn id(&self) -> u64 {
        self.id
    }
}

impl Shape for Segment {
    fn id(&self) -> u64 {
        self.id
    }
}

impl Shape for Polygon {
    fn id(&self) -> u64 {
        assert_eq!(self.label, format!("polygon {}", self.id));
        self.id
    }
}

poly_element!(dyn Shape => Dot, Segment, Polygon);

#[derive(Debug, Clone, Copy)]
enum Kind {
    Dot,
    Segment,
    Polygon,
}

impl Kind {
    fn size(self) -> usize {
        match self {
            Kind::Dot => size_of::<Dot>(),
            Kind::Segment => size_of::<Segment>(),
            Kind::Polygon => size_of::<Polygon>(),
        }
    }
}

fn add_shape<G: GrowthPolicy>(shapes: &mut PolyVec<dyn Shape, G>, kind: Kind, id: u64) {
    match kind {
        Kind::Dot => shapes.add(Dot { id }),
        Kind::Segment => shapes.add(Segment {
            id,
            _ends: [0.0; 4],
        }),
        Kind::Polygon => shapes.add(Polygon {
            id,
            _corners: [0.0; 12],
            label: format!("polygon {id}"),
        }),
    }
}

fn kind_strategy() -> impl Strategy<Value = Kind> {
    prop_oneof![Just(Kind::Dot), Just(Kind::Segment), Just(Kind::Polygon)]
}

#[test]
fn test_empty() {
    let shapes = PolyVec::<dyn Shape>::new();
    assert_eq!(shapes.size(), 0);
    assert!(shapes.is_empty());
    assert_eq!(
        shapes.at(0).err(),
        Some(PolyVecError::IndexOutOfRange { index: 0, len: 0 })
    );
}

#[test]
fn test_single_value() {
    let mut shapes = PolyVec::<dyn Shape>::new();
    shapes.add(Dot { id: 2 });

    assert_eq!(shapes.size(), 1);
    assert_eq!(shapes.at(0).unwrap().id(), 2);
}

#[test]
fn test_two_values() {
    let mut shapes = PolyVec::<dyn Shape>::new();
    shapes.add(Dot { id: 2 });
    shapes.add(Dot { id: 3 });

    assert_eq!(shapes.size(), 2);
    assert_eq!(shapes.at(0).unwrap().id(), 2);
    assert_eq!(shapes.at(1).unwrap().id(), 3);
}

#[test]
fn test_many_mixed_values() {
    let mut shapes = PolyVec::<dyn Shape>::new();
    for id in 0..56 {
        let kind = match id % 3 {
            0 => Kind::Dot,
            1 => Kind::Segment,
            _ => Kind::Polygon,
        };
        add_shape(&mut shapes, kind, id);
    }

    assert_eq!(shapes.size(), 56);
    for index in 0..56 {
        assert_eq!(shapes[index].id(), index as u64);
    }
    assert!(shapes.is_at::<Polygon>(53));
    assert!(shapes.byte_len() <= shapes.capacity());
}

#[test]
fn test_try_add() {
    let mut shapes = PolyVec::<dyn Shape, Exact>::with_growth_policy(Exact);
    assert_eq!(shapes.try_add(Dot { id: 5 }), Ok(()));
    assert_eq!(
        shapes.try_add(Polygon {
            id: 6,
            _corners: [1.0; 12],
            label: String::from("polygon 6"),
        }),
        Ok(())
    );

    assert_eq!(shapes.size(), 2);
    assert_eq!(shapes[0].id(), 5);
    assert_eq!(shapes[1].id(), 6);
    assert_eq!(shapes.growth_policy(), &Exact);
    assert_eq!(shapes.capacity(), shapes.byte_len());
}

proptest! {
    #[test]
    fn prop_values_round_trip(kinds in prop::collection::vec(kind_strategy(), 0..200)) {
        let mut shapes = PolyVec::<dyn Shape>::new();
        for (id, kind) in kinds.iter().enumerate() {
            add_shape(&mut shapes, *kind, id as u64);
        }

        prop_assert_eq!(shapes.size(), kinds.len());
        for index in 0..kinds.len() {
            prop_assert_eq!(shapes.at(index).unwrap().id(), index as u64);
        }
        prop_assert!(shapes.at(kinds.len()).is_err());
    }

    #[test]
    fn prop_sizes_match_concrete_types(kinds in prop::collection::vec(kind_strategy(), 1..100)) {
        let mut shapes = PolyVec::<dyn Shape, Exact>::with_growth_policy(Exact);
        for (id, kind) in kinds.iter().enumerate() {
            add_shape(&mut shapes, *kind, id as u64);
        }

        for (index, kind) in kinds.iter().enumerate() {
            prop_assert_eq!(shapes.size_at(index), Ok(kind.size()));
        }
        prop_assert_eq!(shapes.capacity(), shapes.byte_len());
    }

    #[test]
    fn prop_clear_resets(count in 0usize..100) {
        let mut shapes = PolyVec::<dyn Shape>::new();
        for id in 0..count {
            add_shape(&mut shapes, Kind::Polygon, id as u64);
        }
        let capacity = shapes.capacity();

        shapes.clear();
        prop_assert!(shapes.is_empty());
        prop_assert_eq!(shapes.byte_len(), 0);
        prop_assert_eq!(shapes.capacity(), capacity);
    }
}

fn first_id(shapes: &PolyVec<dyn Shape>) -> Result<u64, Report> {
    let shape = shapes.at(0).context("no shapes were added")?;
    Ok(shape.id())
}

fn reserve_everything(shapes: &mut PolyVec<dyn Shape>) -> Result<(), Report> {
    shapes.try_reserve(usize::MAX)?;
    Ok(())
}

#[test]
fn test_errors_compose_with_reports() {
    let mut shapes = PolyVec::<dyn Shape>::with_growth_policy(Geometric);

    let report = first_id(&shapes).unwrap_err();
    let rendered = format!("{report}");
    assert!(rendered.contains("no shapes were added"));
    assert!(rendered.contains("index 0 is out of range for a poly vector of length 0"));

    shapes.add(Dot { id: 11 });
    assert_eq!(first_id(&shapes).unwrap(), 11);

    let report = reserve_everything(&mut shapes).unwrap_err();
    assert_eq!(
        report.downcast_current_context::<PolyVecError>(),
        Some(&PolyVecError::CapacityOverflow)
    );
    assert_eq!(shapes.size(), 1);
}
