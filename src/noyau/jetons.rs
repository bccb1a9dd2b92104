// src/noyau/jetons.rs

use super::erreur::CalcError;
use super::expr::{Fonction, Op};

#[derive(Clone, Debug, PartialEq)]
pub enum Tok {
    Num(f64),

    // Variables (tout ce qui n’est pas nombre / opérateur / fonction connue)
    Ident(String),
    Fonction(Fonction),

    // + * / ** (le '-' brut reste `Moins` : binaire ou unaire, c’est le parseur qui tranche)
    Op(Op),
    Moins,
    // Marqueur de moins unaire : produit par le parseur seulement (jamais par tokenize)
    Neg,

    LPar,
    RPar,
    Virgule,
}

/// Caractères isolés comme jetons à part entière.
fn est_separateur(c: char) -> bool {
    matches!(c, '+' | '-' | '*' | '/' | '(' | ')' | ',' | '^')
}

/// Tokenize une chaîne en jetons.
/// Supporte:
/// - nombres entiers ou décimaux (ex: 12, 0.5, .5)
/// - opérateurs + - * / et ** (ou ^, alias)
/// - parenthèses ( ) et virgule
/// - fonctions sin cos tan exp log
/// - identifiants [a-zA-Z_][a-zA-Z0-9_]*
///
/// Tout autre morceau (ex: "2x", "3.4.5", "x$", "%") => CalcError::Tokenize.
pub fn tokenize(s: &str) -> Result<Vec<Tok>, CalcError> {
    // 1) on entoure chaque séparateur d’espaces, puis on coupe sur les blancs
    let mut espace = String::with_capacity(s.len() * 2);
    for c in s.chars() {
        if est_separateur(c) {
            espace.push(' ');
            espace.push(c);
            espace.push(' ');
        } else {
            espace.push(c);
        }
    }

    // 2) "*" "*" => "**" AVANT toute classification (seul opérateur à deux caractères)
    let mut morceaux: Vec<&str> = Vec::new();
    for m in espace.split_whitespace() {
        if m == "*" && morceaux.last() == Some(&"*") {
            morceaux.pop();
            morceaux.push("**");
        } else {
            morceaux.push(m);
        }
    }

    // 3) classification
    morceaux.into_iter().map(classe_morceau).collect()
}

fn classe_morceau(m: &str) -> Result<Tok, CalcError> {
    let tok = match m {
        "+" => Tok::Op(Op::Add),
        "-" => Tok::Moins,
        "*" => Tok::Op(Op::Mul),
        "/" => Tok::Op(Op::Div),
        "**" | "^" => Tok::Op(Op::Pow),
        "(" => Tok::LPar,
        ")" => Tok::RPar,
        "," => Tok::Virgule,
        _ => {
            if est_nombre(m) {
                // un littéral trop long pour f64 ne devient pas "inf"
                match m.parse::<f64>() {
                    Ok(v) if v.is_finite() => Tok::Num(v),
                    _ => {
                        return Err(CalcError::Tokenize {
                            morceau: m.to_string(),
                        })
                    }
                }
            } else if let Some(f) = Fonction::from_name(m) {
                Tok::Fonction(f)
            } else if est_identifiant(m) {
                Tok::Ident(m.to_string())
            } else {
                return Err(CalcError::Tokenize {
                    morceau: m.to_string(),
                });
            }
        }
    };
    Ok(tok)
}

/// Chiffres avec au plus un point décimal (pas de notation scientifique).
fn est_nombre(m: &str) -> bool {
    let mut chiffres = 0usize;
    let mut points = 0usize;
    for c in m.chars() {
        match c {
            '0'..='9' => chiffres += 1,
            '.' => points += 1,
            _ => return false,
        }
    }
    chiffres > 0 && points <= 1
}

fn est_identifiant(m: &str) -> bool {
    let mut chars = m.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_')
}

/// Format utilitaire (debug/“démarche”) : liste de jetons en texte.
pub fn format_tokens(tokens: &[Tok]) -> String {
    let mut out = Vec::with_capacity(tokens.len());
    for t in tokens {
        let s = match t {
            Tok::Num(v) => format!("{v}"),
            Tok::Ident(name) => name.clone(),
            Tok::Fonction(f) => f.nom().to_string(),

            Tok::Op(op) => op.symbole().to_string(),
            Tok::Moins => "-".to_string(),
            Tok::Neg => "~".to_string(),

            Tok::LPar => "(".to_string(),
            Tok::RPar => ")".to_string(),
            Tok::Virgule => ",".to_string(),
        };
        out.push(s);
    }
    out.join(" ")
}
