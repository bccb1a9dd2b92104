// src/noyau/format.rs
//
// Affichage infixe canonique.
// - espacement " <op> " entre opérandes, puissance écrite "**"
// - parenthèses seulement si nécessaires (précédence + associativité)
// - le texte produit se relit avec `parse` vers un arbre équivalent

use std::fmt;

use super::expr::{Node, Op, PREC_NEGATION};

/// Précédence vue par l’affichage : une constante négative s’écrit "-3",
/// elle se comporte donc comme une négation (ex: "(-3) ** 2").
fn prec_affichage(e: &Node) -> u8 {
    match e {
        Node::Constant(v) if v.is_sign_negative() => PREC_NEGATION,
        _ => e.precedence(),
    }
}

/// Un enfant d’un noeud binaire doit-il être entouré de parenthèses ?
/// - précédence plus faible : toujours
/// - précédence égale : seulement du côté que l’associativité n’absorbe pas
///   (droite pour - et /, gauche pour **)
fn besoin_parentheses(op: Op, enfant: &Node, a_droite: bool) -> bool {
    let pc = prec_affichage(enfant);
    let ps = op.precedence();

    if pc != ps {
        return pc < ps;
    }
    if op.is_right_associative() {
        !a_droite
    } else {
        a_droite && !op.is_commutative()
    }
}

fn ecrit_enfant(f: &mut fmt::Formatter<'_>, e: &Node, parentheses: bool) -> fmt::Result {
    if parentheses {
        write!(f, "({e})")
    } else {
        write!(f, "{e}")
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Constant(v) => write!(f, "{v}"),
            Node::Variable(name) => f.write_str(name),

            Node::Negate(x) => {
                f.write_str("- ")?;
                ecrit_enfant(f, x, prec_affichage(x) < PREC_NEGATION)
            }

            Node::Call { fonction, arg } => write!(f, "{fonction}({arg})"),

            Node::Binary { op, left, right } => {
                ecrit_enfant(f, left, besoin_parentheses(*op, left, false))?;
                write!(f, " {op} ")?;
                ecrit_enfant(f, right, besoin_parentheses(*op, right, true))
            }
        }
    }
}

impl Node {
    /// Forme texte canonique (équivaut à `to_string()`).
    pub fn to_infix(&self) -> String {
        self.to_string()
    }
}
