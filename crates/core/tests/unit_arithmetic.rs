//! Unit propagation through array and dataset arithmetic, SI labels kept scaled
use approx::assert_relative_eq;
use simpleunits_core::{
    activate, Dataset, LabeledArray, Operation, Quantity, Unit, UnitError, UnitfulArray,
};
use tracing_subscriber::EnvFilter;

#[ctor::ctor]
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn prep_ds() -> Dataset {
    activate(false);
    Dataset::new()
        .with_variable("s", UnitfulArray::from_vec("x", vec![1.0, 2.0, 3.0], "m"))
        .with_variable("t", UnitfulArray::from_vec("x", vec![3.0, 2.0, 1.0], "s"))
}

fn q(value: f64, units: &str) -> Quantity {
    Quantity::with_units(value, units).unwrap()
}

fn u(units: &str) -> Unit {
    Unit::parse(units).unwrap()
}

fn assert_values(actual: &[f64], expected: &[f64]) {
    assert_eq!(actual.len(), expected.len());
    for (a, e) in actual.iter().zip(expected) {
        assert_relative_eq!(*a, *e, max_relative = 1e-12);
    }
}

#[test]
fn test_add() {
    let ds = prep_ds();
    let s = &ds["s"];

    let v = (s + s).unwrap();
    assert_eq!(v.unit().unwrap(), u("m"));
    assert_values(&v.values(), &[2.0, 4.0, 6.0]);

    let vp = (s + q(2.0, "m")).unwrap();
    assert_eq!(vp.unit().unwrap(), u("m"));

    // converted into the left operand's unit
    let vpp = (s + q(6378.0, "km")).unwrap();
    assert_values(&vpp.values(), &[6_378_001.0, 6_378_002.0, 6_378_003.0]);
    assert_eq!(vpp.units(), Some("m"));

    assert_eq!(
        s + &ds["t"],
        Err(UnitError::UnitMismatch {
            operation: Operation::Addition
        })
    );
    assert!(matches!(
        s + q(10.0, "s"),
        Err(UnitError::UnitMismatch { .. })
    ));
}

#[test]
fn test_sub() {
    let ds = prep_ds();
    let t = &ds["t"];

    assert_eq!((t - t).unwrap().unit().unwrap(), u("s"));
    assert_eq!((t - q(5.0, "s")).unwrap().unit().unwrap(), u("s"));

    let vpp = (&ds["s"] - q(10.0, "mm")).unwrap();
    assert_values(&vpp.values(), &[0.99, 1.99, 2.99]);
    assert_eq!(vpp.units(), Some("m"));

    assert_eq!(
        t - &ds["s"],
        Err(UnitError::UnitMismatch {
            operation: Operation::Subtraction
        })
    );
    assert!(matches!(
        t - q(10.0, "m"),
        Err(UnitError::UnitMismatch { .. })
    ));
}

#[test]
fn test_add_error_message() {
    let ds = prep_ds();
    let err = (&ds["s"] + &ds["t"]).unwrap_err();
    assert_eq!(err.to_string(), "Unit mismatch in addition.");
}

#[test]
fn test_mul() {
    let ds = prep_ds();
    let (s, t) = (&ds["s"], &ds["t"]);

    let v = (s * t).unwrap();
    assert_eq!(v.units(), Some("m s"));
    assert_values(&v.values(), &[3.0, 4.0, 3.0]);

    assert_eq!((s * u("s")).unwrap().unit().unwrap(), u("m s"));

    let vpp = (&v * q(2.0, "s")).unwrap();
    assert_eq!(vpp.unit().unwrap(), u("m s2"));
    assert_values(&vpp.values(), &[6.0, 8.0, 6.0]);

    let vppp = (&v * u("kg / s2")).unwrap();
    assert_eq!(vppp.unit().unwrap(), u("kg m / s"));
}

#[test]
fn test_div() {
    let ds = prep_ds();
    let (s, t) = (&ds["s"], &ds["t"]);

    let v = (s / t).unwrap();
    assert_values(&v.values(), &[1.0 / 3.0, 1.0, 3.0]);
    assert_eq!(v.units(), Some("m / s"));

    assert_eq!((s / u("s")).unwrap().unit().unwrap(), u("m / s"));

    let vp = (&v / q(2.0, "s")).unwrap();
    assert_values(&vp.values(), &[1.0 / 6.0, 0.5, 1.5]);
    assert_eq!(vp.unit().unwrap(), u("m / s2"));

    let vppp = (&v / u("s / kg")).unwrap();
    assert_eq!(vppp.unit().unwrap(), u("N"));
}

#[test]
fn test_lin() {
    let ds = prep_ds();
    // t * 7.2 km/h is labelled with a scaled SI unit; the sum converts it into m
    let travelled = (&ds["t"] * q(7.2, "km / h")).unwrap();
    let v = (&ds["s"] + &travelled).unwrap();
    assert_values(&v.values(), &[7.0, 6.0, 5.0]);
    assert_eq!(v.units(), Some("m"));
}

#[test]
fn test_scaled_label_parses_back() {
    let ds = prep_ds();
    let travelled = (&ds["t"] * q(7.2, "km / h")).unwrap();
    assert_values(&travelled.values(), &[21.6, 14.4, 7.2]);
    let label = travelled.units().unwrap();
    assert_eq!(u(label), (u("km / h") * u("s")).unwrap());
    assert_relative_eq!(u(label).scale(), 1.0 / 3.6, max_relative = 1e-12);
}

#[test]
fn test_to_unit() {
    let ds = prep_ds();

    let v = ds["s"].convert_to_unit("mm").unwrap();
    assert_values(&v.values(), &[1000.0, 2000.0, 3000.0]);
    assert_eq!(v.units(), Some("mm"));

    let vp = ds["t"].convert_to_unit("ns").unwrap();
    assert_values(&vp.values(), &[3e9, 2e9, 1e9]);
    assert_eq!(vp.units(), Some("ns"));

    assert!(matches!(
        ds["s"].convert_to_unit("s"),
        Err(UnitError::IncompatibleUnits { .. })
    ));
    assert!(matches!(
        ds["s"].convert_to_unit("furlong"),
        Err(UnitError::UnknownUnit { .. })
    ));
}

#[test]
fn test_to_si() {
    let mut ds = prep_ds();
    ds.insert(
        "v",
        UnitfulArray::from_vec("x", vec![3.6, 7.2, 10.8], "km / h"),
    );
    assert_eq!(ds["v"].units(), Some("km / h"));

    let vp = ds["v"].normalize_to_si().unwrap();
    assert_values(&vp.values(), &[1.0, 2.0, 3.0]);
    assert_eq!(vp.units(), Some("m / s"));
}

#[test]
fn test_conversion_round_trip() {
    let ds = prep_ds();
    let there = ds["s"].convert_to_unit("km").unwrap();
    let back = there.convert_to_unit("m").unwrap();
    assert_values(&back.values(), &ds["s"].values());
    assert_eq!(back.units(), Some("m"));
}

#[test]
fn test_unlabelled_array_is_dimensionless() {
    activate(false);
    let plain = UnitfulArray::new(LabeledArray::from_vec("x", vec![1.0, 2.0]));
    assert_eq!(plain.unit().unwrap(), Unit::dimensionless());
    let r = (&plain + 1.0).unwrap();
    assert_values(&r.values(), &[2.0, 3.0]);
    assert!(matches!(
        &plain + q(1.0, "m"),
        Err(UnitError::UnitMismatch { .. })
    ));
}

#[test]
fn test_ds() {
    let ds = prep_ds();

    let d = ds.mul(&2.0).unwrap();
    assert_values(&d["s"].values(), &[2.0, 4.0, 6.0]);
    assert_values(&d["t"].values(), &[6.0, 4.0, 2.0]);
    assert_eq!(d["s"].units(), Some("m"));
    assert_eq!(d["t"].units(), Some("s"));

    let dp = ds.div(&2.0).unwrap();
    assert_values(&dp["s"].values(), &[0.5, 1.0, 1.5]);
    assert_values(&dp["t"].values(), &[1.5, 1.0, 0.5]);
    assert_eq!(dp["s"].units(), Some("m"));
    assert_eq!(dp["t"].units(), Some("s"));

    let mean = ds.mean("x").unwrap();
    assert_eq!(mean["s"].units(), Some("m"));
    assert_values(&mean["s"].values(), &[2.0]);

    let st = ds.add(&mean).unwrap();
    assert_eq!(st["s"].units(), Some("m"));
    assert_eq!(st["t"].units(), Some("s"));
    assert_values(&st["s"].values(), &[3.0, 4.0, 5.0]);

    let stp = ds.mul(&mean).unwrap();
    assert_eq!(stp["s"].units(), Some("m2"));
    assert_eq!(stp["t"].units(), Some("s2"));

    let stpp = ds.div(&mean).unwrap();
    assert_eq!(stpp["s"].units(), Some(""));
    assert_eq!(stpp["t"].units(), Some(""));

    let v1 = ds.div(&q(1.0, "h")).unwrap();
    assert_eq!(v1["s"].unit().unwrap(), u("m / h"));
    assert_eq!(v1["t"].unit().unwrap(), u("s / h"));

    // converted into the units of the first dataset
    let sp = ds.select(&["s"]).unwrap().add(&q(6378.0, "km")).unwrap();
    assert_eq!(sp.len(), 1);
    assert_values(&sp["s"].values(), &[6_378_001.0, 6_378_002.0, 6_378_003.0]);
    assert_eq!(sp["s"].units(), Some("m"));
}

#[test]
fn test_ds_pairs_variables_by_name() {
    let ds = prep_ds();
    let only_s = ds.select(&["s"]).unwrap();
    let r = ds.add(&only_s).unwrap();
    assert_eq!(r.names().collect::<Vec<_>>(), vec!["s"]);
    assert!(matches!(
        ds.select(&["missing"]),
        Err(UnitError::Array(_))
    ));
}

#[test]
fn test_ds_mismatch_propagates() {
    let ds = prep_ds();
    assert!(matches!(
        ds.add(&q(1.0, "kg")),
        Err(UnitError::UnitMismatch {
            operation: Operation::Addition
        })
    ));
}
