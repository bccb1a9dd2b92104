// src/noyau/numerique.rs
//
// Moteur numérique (consommateur de evaluate() seulement).
// - integrate : méthode des trapèzes sur une grille à N dimensions
// - find_root : dichotomie sur un intervalle qui encadre un changement de signe
// - solve     : balayage à pas fixe de gauche - droite, puis dichotomie par sous-intervalle
//
// Coût : O(pas^dimensions). La grille se relâche avec la dimension
// (1000 / 100 / 10 pas par unité) pour garder un nombre d’échantillons raisonnable.

use itertools::Itertools;
use tracing::{debug, trace};

use super::erreur::CalcError;
use super::eval::Bindings;
use super::expr::Node;

/// Pas par unité pour 1, 2, 3 variables (au-delà : la dernière valeur).
const PAS_PAR_UNITE_DEFAUT: [usize; 3] = [1000, 100, 10];

/// Largeur d’intervalle à laquelle la dichotomie s’arrête.
const TOLERANCE_DEFAUT: f64 = 1e-4;

/// Pas du balayage de `solve`.
const PAS_BALAYAGE_DEFAUT: f64 = 0.01;

/// Arrondi final des intégrales.
const DECIMALES_DEFAUT: u32 = 3;

/// Garde-fou : nombre maximal de demi-intervalles.
const ITERATIONS_MAX_DEFAUT: usize = 200;

/// Garde-fou : nombre maximal de points de grille pour une intégrale.
const POINTS_MAX_DEFAUT: u64 = 100_000_000;

#[derive(Clone, Debug, PartialEq)]
pub struct ParametresNumeriques {
    pub pas_par_unite: Vec<usize>,
    pub tolerance: f64,
    pub pas_balayage: f64,
    pub decimales: u32,
    pub iterations_max: usize,
    pub points_max: u64,
}

impl Default for ParametresNumeriques {
    fn default() -> Self {
        Self {
            pas_par_unite: PAS_PAR_UNITE_DEFAUT.to_vec(),
            tolerance: TOLERANCE_DEFAUT,
            pas_balayage: PAS_BALAYAGE_DEFAUT,
            decimales: DECIMALES_DEFAUT,
            iterations_max: ITERATIONS_MAX_DEFAUT,
            points_max: POINTS_MAX_DEFAUT,
        }
    }
}

impl ParametresNumeriques {
    fn pas_pour(&self, dimensions: usize) -> usize {
        self.pas_par_unite
            .get(dimensions.saturating_sub(1))
            .or(self.pas_par_unite.last())
            .copied()
            .unwrap_or(1)
            .max(1)
    }

    fn verifie(&self) -> Result<(), CalcError> {
        if !(self.tolerance > 0.0) {
            return Err(CalcError::ParametreInvalide {
                nom: "tolerance",
                valeur: self.tolerance,
            });
        }
        if !(self.pas_balayage > 0.0) {
            return Err(CalcError::ParametreInvalide {
                nom: "pas_balayage",
                valeur: self.pas_balayage,
            });
        }
        Ok(())
    }
}

/// Arrondi à `decimales` chiffres après la virgule.
pub fn arrondi(v: f64, decimales: u32) -> f64 {
    let f = 10f64.powi(decimales as i32);
    (v * f).round() / f
}

fn verifie_intervalle(var: &str, (a, b): (f64, f64)) -> Result<(), CalcError> {
    if !a.is_finite() || !b.is_finite() || b < a {
        return Err(CalcError::Intervalle {
            variable: var.to_string(),
            debut: a,
            fin: b,
        });
    }
    Ok(())
}

/// Évalue une expression en une liste de points, liaisons réutilisées d’un point à l’autre.
struct Echantillonneur<'a> {
    expr: &'a Node,
    bindings: Bindings,
}

impl<'a> Echantillonneur<'a> {
    fn new<'v>(expr: &'a Node, variables: impl IntoIterator<Item = &'v str>) -> Self {
        let bindings = variables.into_iter().map(|v| (v.to_string(), 0.0)).collect();
        Self { expr, bindings }
    }

    fn fixe(&mut self, var: &str, x: f64) {
        if let Some(slot) = self.bindings.get_mut(var) {
            *slot = x;
        }
    }

    /// Valeur numérique au point courant ; un reste symbolique est une erreur.
    fn valeur(&self) -> Result<f64, CalcError> {
        let r = self.expr.evaluate(&self.bindings)?;
        r.as_constant().ok_or_else(|| CalcError::NonNumerique {
            expression: r.to_string(),
        })
    }

    fn en(&mut self, var: &str, x: f64) -> Result<f64, CalcError> {
        self.fixe(var, x);
        self.valeur()
    }
}

/* ------------------------ Intégration ------------------------ */

/// Intégrale définie de `expr` sur le pavé décrit par `domaines` (variable, [a, b]).
///
/// Trapèzes : chaque axe est découpé en ceil((b - a) * pas_par_unite) segments,
/// les noeuds d’extrémité pèsent h/2, les noeuds intérieurs h.
/// Résultat arrondi à `params.decimales` chiffres.
/// Une grille de plus de `params.points_max` points => `CalcError::Intervalle`.
pub fn integrate(
    expr: &Node,
    domaines: &[(&str, (f64, f64))],
    params: &ParametresNumeriques,
) -> Result<f64, CalcError> {
    if domaines.is_empty() {
        return Err(CalcError::SansDomaine);
    }
    for (var, intervalle) in domaines {
        verifie_intervalle(var, *intervalle)?;
    }

    let pas_unite = params.pas_pour(domaines.len()) as f64;

    // (début, pas, segments) par axe ; la grille est trop grosse au-delà de points_max
    let mut decoupes: Vec<(f64, f64, u64)> = Vec::with_capacity(domaines.len());
    let mut total = 1.0f64;
    for (var, (a, b)) in domaines {
        let segments = ((b - a) * pas_unite).ceil().max(1.0);
        total *= segments + 1.0;
        if !(total <= params.points_max as f64) {
            return Err(CalcError::Intervalle {
                variable: var.to_string(),
                debut: *a,
                fin: *b,
            });
        }
        let n = segments as u64;
        decoupes.push((*a, (b - a) / n as f64, n));
    }

    // (abscisse, poids) par axe, produits à la demande
    let axes = decoupes.iter().map(|&(a, h, n)| {
        (0..=n).map(move |i| {
            let x = a + i as f64 * h;
            let w = if i == 0 || i == n { 0.5 * h } else { h };
            (x, w)
        })
    });

    let mut ech = Echantillonneur::new(expr, domaines.iter().map(|(v, _)| *v));
    let mut somme = 0.0;
    let mut points = 0usize;

    for point in axes.multi_cartesian_product() {
        let mut poids = 1.0;
        for ((var, _), &(x, w)) in domaines.iter().zip(point.iter()) {
            ech.fixe(var, x);
            poids *= w;
        }
        somme += poids * ech.valeur()?;
        points += 1;
    }

    let resultat = arrondi(somme, params.decimales);
    debug!(expr = %expr, dimensions = domaines.len(), points, resultat, "integrate");
    Ok(resultat)
}

/* ------------------------ Racines ------------------------ */

/// Dichotomie : `Some(milieu)` quand la largeur passe sous la tolérance,
/// `None` si f(a) et f(b) sont strictement du même signe.
pub fn find_root(
    expr: &Node,
    var: &str,
    intervalle: (f64, f64),
    params: &ParametresNumeriques,
) -> Result<Option<f64>, CalcError> {
    params.verifie()?;
    verifie_intervalle(var, intervalle)?;
    let mut ech = Echantillonneur::new(expr, [var]);
    dichotomie(&mut ech, var, intervalle, params)
}

fn dichotomie(
    ech: &mut Echantillonneur<'_>,
    var: &str,
    (a, b): (f64, f64),
    params: &ParametresNumeriques,
) -> Result<Option<f64>, CalcError> {
    let fa = ech.en(var, a)?;
    let fb = ech.en(var, b)?;

    if (fa > 0.0 && fb > 0.0) || (fa < 0.0 && fb < 0.0) {
        return Ok(None);
    }

    // orientation : f(bas) <= 0 <= f(haut)
    let (mut bas, mut haut) = if fa <= fb { (a, b) } else { (b, a) };

    for _ in 0..params.iterations_max {
        let m = (bas + haut) / 2.0;
        if (haut - bas).abs() <= params.tolerance {
            return Ok(Some(m));
        }
        if ech.en(var, m)? <= 0.0 {
            bas = m;
        } else {
            haut = m;
        }
    }

    Ok(Some((bas + haut) / 2.0))
}

/// Résout `left = right` sur `intervalle` : racines de left - right trouvées par
/// balayage (pas `params.pas_balayage`) puis dichotomie sur chaque changement de signe.
///
/// Deux racines plus proches qu’un pas de balayage ne sont pas séparées.
pub fn solve(
    left: &Node,
    right: &Node,
    var: &str,
    intervalle: (f64, f64),
    params: &ParametresNumeriques,
) -> Result<Vec<f64>, CalcError> {
    params.verifie()?;
    verifie_intervalle(var, intervalle)?;

    let nul = Node::sub(left.clone(), right.clone());
    let mut ech = Echantillonneur::new(&nul, [var]);

    let (a, b) = intervalle;
    let pas = params.pas_balayage;
    // petit epsilon : 3.0 / 0.01 ne doit pas tomber à 299
    let n = ((b - a) / pas + 1e-9).floor() as usize;

    let mut racines: Vec<f64> = Vec::new();
    let mut x0 = a;
    let mut f0 = ech.en(var, x0)?;

    for k in 1..=n {
        let x1 = a + k as f64 * pas;
        let f1 = ech.en(var, x1)?;

        if (f0 <= 0.0 && f1 >= 0.0) || (f0 >= 0.0 && f1 <= 0.0) {
            if let Some(r) = dichotomie(&mut ech, var, (x0, x1), params)? {
                let doublon = racines.last().is_some_and(|&p| (r - p).abs() < pas);
                trace!(x0, x1, racine = r, doublon, "changement de signe");
                if !doublon {
                    racines.push(r);
                }
            }
        }

        x0 = x1;
        f0 = f1;
    }

    debug!(equation = %nul, nb = racines.len(), "solve");
    Ok(racines)
}
