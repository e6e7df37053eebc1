//! Coupon calibration through `calibrate_coupon`.

use approx::assert_abs_diff_eq;
use convbond::{
    calibrate_coupon, price, BondTerms, Compounding, ConversionStyle, DividendSchedule,
    EmbeddedOptions, Error, LatticeGrid, MarketParameters, OptionLeg, SoftCall,
    DEFAULT_TARGET_PRICE,
};

fn annual_market() -> MarketParameters {
    MarketParameters::new(100.0, 0.2, 0.05, 0.0, Compounding::from_frequency(1)).unwrap()
}

#[test]
fn straight_bond_calibrates_to_its_yield() {
    let terms = BondTerms::new(100.0, 0.0, 1, 2.0, 0.0);
    let coupon = calibrate_coupon(
        &annual_market(),
        &terms,
        &DividendSchedule::empty(),
        &EmbeddedOptions::none(),
        &LatticeGrid::default(),
        DEFAULT_TARGET_PRICE,
    )
    .unwrap();
    assert_abs_diff_eq!(coupon, 0.05, epsilon = 1e-8);
}

fn issue_terms() -> BondTerms {
    BondTerms::new(1000.0, 0.0, 2, 5.0, 20.0)
        .with_conversion_style(ConversionStyle::American)
        .with_dividend_protection(0.005)
}

fn annual_dividends() -> DividendSchedule {
    DividendSchedule::from_rows(&[[1.0, 0.01], [2.0, 0.01], [3.0, 0.01]]).unwrap()
}

#[test]
fn calibrated_coupon_reprices_at_par() {
    // Parity 600 on a 1000 face with a 9 % risky rate: the zero-coupon bond
    // sits well below par.
    let market = MarketParameters::new(30.0, 0.35, 0.03, 0.06, Compounding::Continuous).unwrap();
    let options = EmbeddedOptions::none()
        .with_soft_call(SoftCall::new(3.0, 1.0, 65.0).unwrap())
        .with_put(OptionLeg::new(4.0, 0.9).unwrap());
    let grid = LatticeGrid::new(40).unwrap();
    let terms = issue_terms();
    let dividends = annual_dividends();

    let zero_coupon = price(&market, &terms, &dividends, &options, &grid).unwrap();
    assert!(zero_coupon < 1000.0, "zero-coupon price {zero_coupon}");

    let coupon = calibrate_coupon(&market, &terms, &dividends, &options, &grid, 1.0).unwrap();
    assert!(coupon > 0.0 && coupon < 0.3, "coupon = {coupon}");
    let npv = price(&market, &terms.with_coupon_rate(coupon), &dividends, &options, &grid).unwrap();
    assert_abs_diff_eq!(npv, 1000.0, epsilon = 1e-5);
}

#[test]
fn rich_convertible_cannot_issue_at_par() {
    // A par put at three years and parity 800 are worth more than face
    // before any coupon is paid.
    let market = MarketParameters::new(40.0, 0.35, 0.03, 0.04, Compounding::Continuous).unwrap();
    let options = EmbeddedOptions::none()
        .with_soft_call(SoftCall::new(3.0, 1.0, 65.0).unwrap())
        .with_put(OptionLeg::new(3.0, 1.0).unwrap());
    let grid = LatticeGrid::new(40).unwrap();

    let err = calibrate_coupon(&market, &issue_terms(), &annual_dividends(), &options, &grid, 1.0)
        .unwrap_err();
    match err {
        Error::RootNotFound { lower, f_lower, .. } => {
            assert_eq!(lower, 0.0);
            assert!(f_lower > 0.0);
        }
        other => panic!("expected RootNotFound, got {other:?}"),
    }
}

#[test]
fn coupon_on_the_terms_is_ignored() {
    let grid = LatticeGrid::default();
    let none = EmbeddedOptions::none();
    let empty = DividendSchedule::empty();
    let a = BondTerms::new(100.0, 0.0, 1, 2.0, 0.0);
    let b = a.with_coupon_rate(0.3);
    let ca = calibrate_coupon(&annual_market(), &a, &empty, &none, &grid, 1.0).unwrap();
    let cb = calibrate_coupon(&annual_market(), &b, &empty, &none, &grid, 1.0).unwrap();
    assert_eq!(ca, cb);
}

#[test]
fn unreachable_target_reports_the_bracket() {
    // Parity alone is worth 1.5 × face, so no coupon prices the bond at par.
    let market = MarketParameters::new(150.0, 0.2, 0.05, 0.0, Compounding::Continuous).unwrap();
    let terms = BondTerms::new(100.0, 0.0, 1, 2.0, 1.0);
    let err = calibrate_coupon(
        &market,
        &terms,
        &DividendSchedule::empty(),
        &EmbeddedOptions::none(),
        &LatticeGrid::default(),
        1.0,
    )
    .unwrap_err();
    match err {
        Error::RootNotFound { lower, f_lower, .. } => {
            assert_eq!(lower, 0.0);
            assert!(f_lower > 0.0);
        }
        other => panic!("expected RootNotFound, got {other:?}"),
    }
}

#[test]
fn invalid_inputs_are_rejected() {
    let terms = BondTerms::new(100.0, 0.0, 0, 2.0, 0.0);
    let err = calibrate_coupon(
        &annual_market(),
        &terms,
        &DividendSchedule::empty(),
        &EmbeddedOptions::none(),
        &LatticeGrid::default(),
        1.0,
    )
    .unwrap_err();
    assert!(err.is_invalid_input());

    let terms = BondTerms::new(100.0, 0.0, 1, 2.0, 0.0);
    let err = calibrate_coupon(
        &annual_market(),
        &terms,
        &DividendSchedule::empty(),
        &EmbeddedOptions::none(),
        &LatticeGrid::default(),
        -1.0,
    )
    .unwrap_err();
    assert!(err.is_invalid_input());
}

#[cfg(feature = "serde")]
#[test]
fn inputs_load_from_json() {
    let market: MarketParameters = serde_json::from_str(
        r#"{"spot":100.0,"volatility":0.2,"risk_free_rate":0.05,"credit_spread":0.0,
            "compounding":{"Compounded":1}}"#,
    )
    .unwrap();
    let terms: BondTerms = serde_json::from_str(
        r#"{"face_value":100.0,"coupon_rate":0.0,"coupon_frequency":1,"maturity":2.0,
            "conversion_ratio":0.0,"no_conversion_period":0.0,"conversion_style":"American",
            "redemption_premium":0.0,"dividend_protection":null}"#,
    )
    .unwrap();
    let dividends: DividendSchedule = serde_json::from_str("[]").unwrap();
    let grid: LatticeGrid = serde_json::from_str(r#"{"steps_per_year":50}"#).unwrap();
    let coupon =
        calibrate_coupon(&market, &terms, &dividends, &EmbeddedOptions::none(), &grid, 1.0)
            .unwrap();
    assert_abs_diff_eq!(coupon, 0.05, epsilon = 1e-8);
}
