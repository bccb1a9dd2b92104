// src/noyau/expr.rs
//
// Arbre d’expression (flottants f64).
// - Constant : valeur numérique
// - Variable : symbole libre (ex: x), substitué à l’évaluation
// - Negate   : moins unaire
// - Call     : fonction unaire (sin, cos, tan, exp, log)
// - Binary   : + - * / **
//
// IMPORTANT:
// - Un arbre n’est jamais modifié après construction : evaluate/differentiate
//   construisent toujours un NOUVEL arbre.
// - Précédence/commutativité sont portées par `Op` (fixées à la construction).

use std::collections::BTreeSet;
use std::fmt;
use std::ops;

use super::erreur::CalcError;

/// Précédence des atomes (Constant, Variable, Call) : jamais parenthésés.
pub const PREC_ATOME: u8 = 10;

/// Précédence du moins unaire : au-dessus de * et /, au niveau de **.
/// Avec la règle d’associativité du parseur, "-x**2" se lit "-(x**2)".
pub const PREC_NEGATION: u8 = 3;

/* ------------------------ Opérateurs binaires ------------------------ */

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Op {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

impl Op {
    pub fn symbole(self) -> &'static str {
        match self {
            Op::Add => "+",
            Op::Sub => "-",
            Op::Mul => "*",
            Op::Div => "/",
            Op::Pow => "**",
        }
    }

    pub fn precedence(self) -> u8 {
        match self {
            Op::Add | Op::Sub => 1,
            Op::Mul | Op::Div => 2,
            Op::Pow => 3,
        }
    }

    pub fn is_commutative(self) -> bool {
        matches!(self, Op::Add | Op::Mul)
    }

    pub fn is_right_associative(self) -> bool {
        matches!(self, Op::Pow)
    }

    /// Applique l’opérateur à deux constantes.
    /// Division par zéro et résultat non fini (NaN, dépassement) sont des erreurs,
    /// jamais des valeurs : une constante pliée reste toujours affichable.
    pub fn apply(self, a: f64, b: f64) -> Result<f64, CalcError> {
        let r = match self {
            Op::Add => a + b,
            Op::Sub => a - b,
            Op::Mul => a * b,
            Op::Div => {
                if b == 0.0 {
                    return Err(CalcError::DivisionByZero);
                }
                a / b
            }
            Op::Pow => {
                // 0 ** (-n) = 1/0
                if a == 0.0 && b < 0.0 {
                    return Err(CalcError::DivisionByZero);
                }
                a.powf(b)
            }
        };

        if !r.is_finite() {
            return Err(CalcError::Domain {
                fonction: self.symbole().to_string(),
                valeur: a,
            });
        }
        Ok(r)
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbole())
    }
}

/* ------------------------ Fonctions unaires ------------------------ */

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Fonction {
    Sin,
    Cos,
    Tan,
    Exp,
    Log,
}

impl Fonction {
    /// Identificateurs reconnus comme fonctions.
    pub fn from_name(name: &str) -> Option<Fonction> {
        match name {
            "sin" => Some(Fonction::Sin),
            "cos" => Some(Fonction::Cos),
            "tan" => Some(Fonction::Tan),
            "exp" => Some(Fonction::Exp),
            "log" => Some(Fonction::Log),
            _ => None,
        }
    }

    pub fn nom(self) -> &'static str {
        match self {
            Fonction::Sin => "sin",
            Fonction::Cos => "cos",
            Fonction::Tan => "tan",
            Fonction::Exp => "exp",
            Fonction::Log => "log",
        }
    }

    /// Valeur numérique ; `log` hors domaine ou résultat non fini => DomainError.
    pub fn apply(self, v: f64) -> Result<f64, CalcError> {
        let r = match self {
            Fonction::Sin => v.sin(),
            Fonction::Cos => v.cos(),
            Fonction::Tan => v.tan(),
            Fonction::Exp => v.exp(),
            Fonction::Log => {
                if v <= 0.0 {
                    return Err(self.hors_domaine(v));
                }
                v.ln()
            }
        };
        if !r.is_finite() {
            return Err(self.hors_domaine(v));
        }
        Ok(r)
    }

    fn hors_domaine(self, v: f64) -> CalcError {
        CalcError::Domain {
            fonction: self.nom().to_string(),
            valeur: v,
        }
    }
}

impl fmt::Display for Fonction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.nom())
    }
}

/* ------------------------ Noeud ------------------------ */

/// Égalité structurelle (forme de l’arbre + valeurs des feuilles).
#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    Constant(f64),
    Variable(String),
    Negate(Box<Node>),
    Call {
        fonction: Fonction,
        arg: Box<Node>,
    },
    Binary {
        op: Op,
        left: Box<Node>,
        right: Box<Node>,
    },
}

impl Node {
    pub fn constant(v: f64) -> Node {
        Node::Constant(v)
    }

    pub fn var(name: impl Into<String>) -> Node {
        Node::Variable(name.into())
    }

    pub fn neg(x: Node) -> Node {
        Node::Negate(Box::new(x))
    }

    pub fn call(fonction: Fonction, arg: Node) -> Node {
        Node::Call {
            fonction,
            arg: Box::new(arg),
        }
    }

    pub fn binary(op: Op, left: Node, right: Node) -> Node {
        Node::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn add(a: Node, b: Node) -> Node {
        Node::binary(Op::Add, a, b)
    }

    pub fn sub(a: Node, b: Node) -> Node {
        Node::binary(Op::Sub, a, b)
    }

    pub fn mul(a: Node, b: Node) -> Node {
        Node::binary(Op::Mul, a, b)
    }

    pub fn div(a: Node, b: Node) -> Node {
        Node::binary(Op::Div, a, b)
    }

    pub fn pow(a: Node, b: Node) -> Node {
        Node::binary(Op::Pow, a, b)
    }

    pub fn precedence(&self) -> u8 {
        match self {
            Node::Constant(_) | Node::Variable(_) | Node::Call { .. } => PREC_ATOME,
            Node::Negate(_) => PREC_NEGATION,
            Node::Binary { op, .. } => op.precedence(),
        }
    }

    /// Some(v) si la racine est une constante (résultat entièrement numérique).
    pub fn as_constant(&self) -> Option<f64> {
        match self {
            Node::Constant(v) => Some(*v),
            _ => None,
        }
    }

    pub fn is_constant(&self) -> bool {
        matches!(self, Node::Constant(_))
    }

    /// Vrai si `name` apparaît quelque part dans l’arbre.
    pub fn contains_variable(&self, name: &str) -> bool {
        match self {
            Node::Constant(_) => false,
            Node::Variable(v) => v == name,
            Node::Negate(x) | Node::Call { arg: x, .. } => x.contains_variable(name),
            Node::Binary { left, right, .. } => {
                left.contains_variable(name) || right.contains_variable(name)
            }
        }
    }

    /// Vrai si l’arbre contient au moins une variable.
    pub fn has_variables(&self) -> bool {
        match self {
            Node::Constant(_) => false,
            Node::Variable(_) => true,
            Node::Negate(x) | Node::Call { arg: x, .. } => x.has_variables(),
            Node::Binary { left, right, .. } => left.has_variables() || right.has_variables(),
        }
    }

    /// Noms des variables libres, triés et sans doublons.
    pub fn variables(&self) -> Vec<String> {
        fn collecte(e: &Node, acc: &mut BTreeSet<String>) {
            match e {
                Node::Constant(_) => {}
                Node::Variable(v) => {
                    acc.insert(v.clone());
                }
                Node::Negate(x) | Node::Call { arg: x, .. } => collecte(x, acc),
                Node::Binary { left, right, .. } => {
                    collecte(left, acc);
                    collecte(right, acc);
                }
            }
        }

        let mut acc = BTreeSet::new();
        collecte(self, &mut acc);
        acc.into_iter().collect()
    }
}

impl From<f64> for Node {
    fn from(v: f64) -> Self {
        Node::Constant(v)
    }
}

impl From<&str> for Node {
    fn from(name: &str) -> Self {
        Node::Variable(name.to_string())
    }
}

/* ------------------------ Surcharge d’opérateurs ------------------------ */

impl ops::Add for Node {
    type Output = Node;
    fn add(self, rhs: Node) -> Node {
        Node::add(self, rhs)
    }
}

impl ops::Sub for Node {
    type Output = Node;
    fn sub(self, rhs: Node) -> Node {
        Node::sub(self, rhs)
    }
}

impl ops::Mul for Node {
    type Output = Node;
    fn mul(self, rhs: Node) -> Node {
        Node::mul(self, rhs)
    }
}

impl ops::Div for Node {
    type Output = Node;
    fn div(self, rhs: Node) -> Node {
        Node::div(self, rhs)
    }
}

impl ops::Neg for Node {
    type Output = Node;
    fn neg(self) -> Node {
        Node::neg(self)
    }
}
