// src/noyau/derivee.rs
//
// Dérivation symbolique (transformation structurelle pure).
// - differentiate()        : variable implicite, TOUTE variable a pour dérivée 1
//                            (arbre à une seule variable ; multi-variables = résultat partiel)
// - differentiate_wrt("x") : les autres variables sont traitées comme des constantes
//
// L’arbre brut (règles de la chaîne / du produit / du quotient) est ensuite passé
// par evaluate() sans variable liée : élimination des 0 et des 1, pliage des constantes.
// Les erreurs de ce pliage (DomainError, DivisionByZero) remontent telles quelles.

use tracing::debug;

use super::erreur::CalcError;
use super::expr::{Fonction, Node, Op};

impl Node {
    /// Dérivée par rapport à “la” variable de l’arbre.
    pub fn differentiate(&self) -> Result<Node, CalcError> {
        derive_et_simplifie(self, None)
    }

    /// Dérivée par rapport à `var` (les autres variables sont constantes).
    pub fn differentiate_wrt(&self, var: &str) -> Result<Node, CalcError> {
        derive_et_simplifie(self, Some(var))
    }
}

fn derive_et_simplifie(e: &Node, var: Option<&str>) -> Result<Node, CalcError> {
    let brute = derivee(e, var);
    let simple = brute.simplify()?;
    debug!(expr = %e, var = var.unwrap_or("*"), brute = %brute, derivee = %simple, "differentiate");
    Ok(simple)
}

/// L’expression dépend-elle de la variable de dérivation ?
fn depend(e: &Node, var: Option<&str>) -> bool {
    match var {
        Some(v) => e.contains_variable(v),
        None => e.has_variables(),
    }
}

fn c(v: f64) -> Node {
    Node::Constant(v)
}

fn derivee(e: &Node, var: Option<&str>) -> Node {
    match e {
        Node::Constant(_) => c(0.0),

        Node::Variable(name) => match var {
            Some(v) if v != name => c(0.0),
            _ => c(1.0),
        },

        Node::Negate(x) => Node::neg(derivee(x, var)),

        // règle de la chaîne : f'(u) * u'
        Node::Call { fonction, arg } => {
            let u = arg.as_ref().clone();
            let du = derivee(arg, var);
            let externe = match fonction {
                Fonction::Sin => Node::call(Fonction::Cos, u),
                Fonction::Cos => Node::neg(Node::call(Fonction::Sin, u)),
                Fonction::Tan => Node::div(c(1.0), Node::pow(Node::call(Fonction::Cos, u), c(2.0))),
                Fonction::Exp => Node::call(Fonction::Exp, u),
                Fonction::Log => Node::div(c(1.0), u),
            };
            Node::mul(externe, du)
        }

        Node::Binary { op, left, right } => derivee_binaire(*op, left, right, var),
    }
}

fn derivee_binaire(op: Op, f: &Node, g: &Node, var: Option<&str>) -> Node {
    let df = || derivee(f, var);
    let dg = || derivee(g, var);

    match op {
        Op::Add | Op::Sub => Node::binary(op, df(), dg()),

        Op::Mul => {
            if !depend(f, var) {
                // c * g' (facteur constant conservé)
                Node::mul(f.clone(), dg())
            } else if !depend(g, var) {
                Node::mul(df(), g.clone())
            } else {
                // produit : f'g + fg'
                Node::add(Node::mul(df(), g.clone()), Node::mul(f.clone(), dg()))
            }
        }

        Op::Div => {
            if !depend(g, var) {
                Node::div(df(), g.clone())
            } else {
                // quotient : (f'g - fg') / g**2
                Node::div(
                    Node::sub(Node::mul(df(), g.clone()), Node::mul(f.clone(), dg())),
                    Node::pow(g.clone(), c(2.0)),
                )
            }
        }

        Op::Pow => match (depend(f, var), depend(g, var)) {
            (false, false) => c(0.0),

            // puissance : c * f**(c-1) * f'
            (true, false) => Node::mul(
                Node::mul(g.clone(), Node::pow(f.clone(), Node::sub(g.clone(), c(1.0)))),
                df(),
            ),

            // exponentielle : a**g * log(a) * g'
            (false, true) => Node::mul(
                Node::mul(
                    Node::pow(f.clone(), g.clone()),
                    Node::call(Fonction::Log, f.clone()),
                ),
                dg(),
            ),

            // cas général : f**g * (g' * log(f) + g * f' / f)
            (true, true) => Node::mul(
                Node::pow(f.clone(), g.clone()),
                Node::add(
                    Node::mul(dg(), Node::call(Fonction::Log, f.clone())),
                    Node::div(Node::mul(g.clone(), df()), f.clone()),
                ),
            ),
        },
    }
}
