//! Tests scientifiques (campagne) : propriétés attendues du noyau.
//!
//! - précédence / associativité / moins unaire (valeurs exactes)
//! - affichage -> relecture -> évaluation : même valeur
//! - dérivée : contrôle par différence finie
//! - moteur numérique : scénario de résolution
//! - stress borné (longueur, profondeur) avec budget temps

use std::time::{Duration, Instant};

use approx::assert_abs_diff_eq;

use super::{
    eval_expression, parse, solve, Bindings, CalcError, Node, ParametresNumeriques, ParseError,
};

fn valeur(expr: &str) -> f64 {
    let ev = eval_expression(expr, &Bindings::new())
        .unwrap_or_else(|e| panic!("expr={expr:?} err={e}"));
    ev.valeur()
        .unwrap_or_else(|| panic!("expr={expr:?} non numérique: {}", ev.apres))
}

fn avec(paires: &[(&str, f64)]) -> Bindings {
    paires.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}

/// Budget global anti-gel.
fn budget(start: Instant, max: Duration) {
    if start.elapsed() > max {
        panic!("budget temps dépassé: {:?}", max);
    }
}

/* ------------------------ Lecture ------------------------ */

#[test]
fn sci_precedence() {
    assert_eq!(parse("2+3*4").unwrap().simplify(), Ok(Node::Constant(14.0)));
    assert_eq!(parse("(2+3)*4").unwrap().simplify(), Ok(Node::Constant(20.0)));
}

#[test]
fn sci_puissance_associative_a_droite() {
    assert_eq!(valeur("2**3**2"), 512.0);
    assert_eq!(valeur("(2**3)**2"), 64.0);
    assert_eq!(valeur("2^3^2"), 512.0);
}

#[test]
fn sci_soustraction_associative_a_gauche() {
    assert_eq!(valeur("2-3-4"), -5.0);
    assert_eq!(valeur("2-(3-4)"), 3.0);
    assert_eq!(valeur("16/4/2"), 2.0);
}

#[test]
fn sci_moins_unaire() {
    assert_eq!(valeur("-2+3"), 1.0);
    assert_eq!(valeur("2*-3"), -6.0);
    assert_eq!(valeur("2 - -3"), 5.0);
    assert_eq!(valeur("-(2+3)"), -5.0);
    // négation moins prioritaire que la puissance
    assert_eq!(valeur("-2**2"), -4.0);
    assert_eq!(valeur("(-2)**2"), 4.0);
    assert_eq!(valeur("2**-1"), 0.5);
}

#[test]
fn sci_erreurs_typees() {
    assert_eq!(
        eval_expression("1/0", &Bindings::new()),
        Err(CalcError::DivisionByZero)
    );
    assert!(matches!(
        eval_expression("log(-2)", &Bindings::new()),
        Err(CalcError::Domain { ref fonction, valeur }) if fonction == "log" && valeur == -2.0
    ));
    assert!(matches!(
        eval_expression("2 # 3", &Bindings::new()),
        Err(CalcError::Tokenize { ref morceau }) if morceau == "#"
    ));
    assert_eq!(
        eval_expression("(2", &Bindings::new()),
        Err(CalcError::Parse(ParseError::ParentheseNonFermee))
    );
}

/* ------------------------ Évaluation ------------------------ */

#[test]
fn sci_elimination_des_identites() {
    let e = parse("x*1").unwrap();
    assert_eq!(e.evaluate(&Bindings::new()), Ok(Node::var("x")));

    let e = parse("(x + 0) * (y ** 1) - 0").unwrap();
    assert_eq!(
        e.simplify().unwrap(),
        Node::mul(Node::var("x"), Node::var("y"))
    );
}

#[test]
fn sci_evaluation_deterministe() {
    let e = parse("sin(x) * y + log(z) - x ** 2").unwrap();
    let b = avec(&[("x", 0.3), ("z", 2.0)]);
    let r1 = e.evaluate(&b).unwrap();
    let r2 = e.evaluate(&b).unwrap();
    assert_eq!(r1, r2);
    assert!(!r1.is_constant());
}

#[test]
fn sci_relecture_apres_affichage() {
    let b = avec(&[("x", 1.25), ("y", -0.5), ("z", 3.0)]);
    for s in [
        "x - (y - z)",
        "x / (y * z)",
        "(x ** 2) ** 3",
        "-x ** 2 + (-y) ** 2",
        "sin(x) * cos(y) / (1 + z)",
        "2 * -x - -3",
        "x + 0 * y",
        "exp(-(x + y)) * log(z)",
    ] {
        let t = parse(s).unwrap();
        let texte = t.to_string();
        let relu = parse(&texte).unwrap_or_else(|e| panic!("relecture de {texte:?}: {e}"));

        // sans liaison : mêmes formes simplifiées
        assert_eq!(
            t.simplify().map(|n| n.to_string()),
            relu.simplify().map(|n| n.to_string()),
            "s={s:?} texte={texte:?}"
        );

        // avec liaisons : mêmes valeurs
        let v1 = t.evaluate(&b).unwrap().as_constant().unwrap();
        let v2 = relu.evaluate(&b).unwrap().as_constant().unwrap();
        assert_abs_diff_eq!(v1, v2, epsilon = 1e-12);
    }
}

#[test]
fn sci_pliage_jamais_infini() {
    for s in ["exp(1000)", "2 ** 2000", "x * exp(1000)"] {
        assert!(
            matches!(parse(s).unwrap().simplify(), Err(CalcError::Domain { .. })),
            "s={s:?}"
        );
    }

    // grande constante finie : s’affiche en chiffres et se relit à l’identique
    let v = parse("exp(700)").unwrap().simplify().unwrap();
    let relu = parse(&v.to_string()).unwrap();
    assert!(relu.is_constant(), "relu={relu:?}");
    assert_eq!(relu.simplify(), Ok(v));
}

/* ------------------------ Dérivée ------------------------ */

#[test]
fn sci_derivee_x_cube() {
    let t = Node::pow(Node::var("x"), Node::Constant(3.0));
    let d = t.differentiate().unwrap();
    assert_eq!(d.evaluate(&avec(&[("x", 2.0)])), Ok(Node::Constant(12.0)));
}

#[test]
fn sci_derivee_difference_finie() {
    let h = 1e-6;
    for s in [
        "x ** 3 - 2 * x",
        "sin(x) * cos(x)",
        "exp(2 * x) / (1 + x ** 2)",
        "log(x ** 2 + 1)",
        "tan(x / 2)",
        "x ** x",
        "-(x - 3) ** 2",
    ] {
        let t = parse(s).unwrap();
        let d = t.differentiate().unwrap();
        for x0 in [0.4, 0.9, 1.7] {
            let f = |x: f64| t.evaluate(&avec(&[("x", x)])).unwrap().as_constant().unwrap();
            let approx_d = (f(x0 + h) - f(x0 - h)) / (2.0 * h);
            let exact = d.evaluate(&avec(&[("x", x0)])).unwrap().as_constant().unwrap();
            assert_abs_diff_eq!(exact, approx_d, epsilon = 1e-5 * (1.0 + exact.abs()));
        }
    }
}

/* ------------------------ Numérique ------------------------ */

#[test]
fn sci_resolution_scenario() {
    let gauche = parse("x**2 - 4").unwrap();
    let racines = solve(
        &gauche,
        &Node::Constant(0.0),
        "x",
        (0.0, 3.0),
        &ParametresNumeriques::default(),
    )
    .unwrap();
    assert!(racines.iter().any(|r| (r - 2.0).abs() < 1e-3), "{racines:?}");
}

#[test]
fn sci_resolution_deux_membres() {
    // x**2 = x + 2 sur [-3, 3] : -1 et 2
    let racines = solve(
        &parse("x ** 2").unwrap(),
        &parse("x + 2").unwrap(),
        "x",
        (-3.0, 3.0),
        &ParametresNumeriques::default(),
    )
    .unwrap();
    assert_eq!(racines.len(), 2, "{racines:?}");
    assert_abs_diff_eq!(racines[0], -1.0, epsilon = 1e-3);
    assert_abs_diff_eq!(racines[1], 2.0, epsilon = 1e-3);
}

/* ------------------------ Stress contrôlé (sans brûler) ------------------------ */

#[test]
fn sci_stress_longue_somme() {
    let t0 = Instant::now();
    let max = Duration::from_millis(500);

    let expr = vec!["1/2"; 400].join(" + ");
    budget(t0, max);

    assert_eq!(valeur(&expr), 200.0);
    budget(t0, max);
}

#[test]
fn sci_stress_imbrication_moderee() {
    let t0 = Instant::now();
    let max = Duration::from_millis(500);

    // sin(sin(...sin(x)...)) sur 200 niveaux : dérivable et affichable
    let mut expr = "x".to_string();
    for _ in 0..200 {
        expr = format!("sin({expr})");
    }
    let t = parse(&expr).unwrap();
    budget(t0, max);

    assert_eq!(t.to_string(), expr);
    let d = t.differentiate().unwrap();
    let v = d.evaluate(&avec(&[("x", 0.0)])).unwrap();
    assert_eq!(v, Node::Constant(1.0));
    budget(t0, max);
}
