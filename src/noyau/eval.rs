//! Noyau — évaluation (pipeline réel)
//!
//! tokenize -> RPN -> Node -> evaluate (substitution + identités + pliage des constantes)
//!
//! Remarque : evaluate ne garantit PAS une réduction complète ; s’il reste des
//! variables libres, le résultat est un arbre partiellement simplifié (jamais une chaîne).

use std::collections::HashMap;

use num_traits::{One, Zero};
use tracing::debug;

use super::erreur::{CalcError, ParseError};
use super::expr::{Node, Op};
use super::jetons::{format_tokens, tokenize};
use super::rpn::{from_rpn, to_rpn};

/// Valeurs des variables, fournies explicitement à chaque appel.
pub type Bindings = HashMap<String, f64>;

impl Node {
    /// Évalue l’arbre sous `bindings` et renvoie un NOUVEL arbre.
    ///
    /// - racine `Constant` => résultat entièrement numérique
    /// - sinon => forme symbolique simplifiée (variables libres restantes)
    pub fn evaluate(&self, bindings: &Bindings) -> Result<Node, CalcError> {
        match self {
            Node::Constant(_) => Ok(self.clone()),

            Node::Variable(name) => Ok(match bindings.get(name) {
                Some(v) => Node::Constant(*v),
                None => self.clone(),
            }),

            Node::Negate(x) => Ok(nier(x.evaluate(bindings)?)),

            Node::Call { fonction, arg } => {
                let a = arg.evaluate(bindings)?;
                match a {
                    Node::Constant(v) => Ok(Node::Constant(fonction.apply(v)?)),
                    _ => Ok(Node::call(*fonction, a)),
                }
            }

            Node::Binary { op, left, right } => {
                let a = left.evaluate(bindings)?;
                let b = right.evaluate(bindings)?;
                simplifie_binaire(*op, a, b)
            }
        }
    }

    /// Raccourci : évaluation sans aucune variable liée.
    pub fn simplify(&self) -> Result<Node, CalcError> {
        self.evaluate(&Bindings::new())
    }
}

/// -c plié immédiatement, sinon Negate(x).
fn nier(x: Node) -> Node {
    match x {
        Node::Constant(v) => Node::Constant(-v),
        autre => Node::neg(autre),
    }
}

fn est_zero(c: Option<f64>) -> bool {
    c.is_some_and(|v| v.is_zero())
}

fn est_un(c: Option<f64>) -> bool {
    c.is_some_and(|v| v.is_one())
}

/// Identités (zéro puis un) AVANT le pliage constante/constante.
fn simplifie_binaire(op: Op, a: Node, b: Node) -> Result<Node, CalcError> {
    let ca = a.as_constant();
    let cb = b.as_constant();

    // --- zéro ---
    match op {
        Op::Add if est_zero(ca) => return Ok(b),
        Op::Add if est_zero(cb) => return Ok(a),
        Op::Sub if est_zero(cb) => return Ok(a),
        Op::Sub if est_zero(ca) => return Ok(nier(b)),
        Op::Mul if est_zero(ca) || est_zero(cb) => return Ok(Node::Constant(0.0)),
        // 0 / 0 : laissé au pliage (=> DivisionByZero)
        Op::Div if est_zero(ca) && !est_zero(cb) => return Ok(Node::Constant(0.0)),
        // exposant nul d’abord : 0 ** 0 = 1
        Op::Pow if est_zero(cb) => return Ok(Node::Constant(1.0)),
        // 0 ** (-n) : laissé au pliage (=> DivisionByZero)
        Op::Pow if est_zero(ca) && cb.map_or(true, |v| v > 0.0) => {
            return Ok(Node::Constant(0.0))
        }
        _ => {}
    }

    // --- un ---
    match op {
        Op::Mul if est_un(ca) => return Ok(b),
        Op::Mul if est_un(cb) => return Ok(a),
        Op::Div if est_un(cb) => return Ok(a),
        Op::Pow if est_un(cb) => return Ok(a),
        Op::Pow if est_un(ca) => return Ok(Node::Constant(1.0)),
        _ => {}
    }

    // --- pliage ---
    if let (Some(x), Some(y)) = (ca, cb) {
        return Ok(Node::Constant(op.apply(x, y)?));
    }

    Ok(Node::binary(op, a, b))
}

/* ------------------------ Pipeline texte -> résultat ------------------------ */

/// Résultat du pipeline + “démarche” (jetons, RPN, avant/après).
#[derive(Clone, Debug, PartialEq)]
pub struct Evaluation {
    pub resultat: Node,
    pub jetons: String,
    pub rpn: String,
    pub avant: String,
    pub apres: String,
}

impl Evaluation {
    /// Some(v) si le résultat est entièrement numérique.
    pub fn valeur(&self) -> Option<f64> {
        self.resultat.as_constant()
    }
}

/// API publique : lit, construit l’arbre, l’évalue sous `bindings`.
pub fn eval_expression(expr_str: &str, bindings: &Bindings) -> Result<Evaluation, CalcError> {
    let s = expr_str.trim();
    if s.is_empty() {
        return Err(ParseError::ExpressionVide.into());
    }

    // 1) Jetons
    let jetons = tokenize(s)?;

    // 2) RPN
    let rpn = to_rpn(&jetons)?;

    // 3) Arbre
    let arbre = from_rpn(&rpn)?;

    // 4) Évaluation
    let resultat = arbre.evaluate(bindings)?;

    let ev = Evaluation {
        jetons: format_tokens(&jetons),
        rpn: format_tokens(&rpn),
        avant: arbre.to_string(),
        apres: resultat.to_string(),
        resultat,
    };
    debug!(entree = s, avant = %ev.avant, apres = %ev.apres, "eval_expression");
    Ok(ev)
}
