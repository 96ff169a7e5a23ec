//! Boolean regions over surface half-spaces.
//!
//! Regions print and parse with the usual CSG expression syntax:
//! `-5` / `+5` (or bare `5`) are half-spaces, juxtaposition is
//! intersection, `|` is union and `~` is complement, with precedence
//! `~` > intersection > union.

use std::fmt;
use std::ops::{BitAnd, BitOr, Not};
use std::str::FromStr;

use mcvol_math::{Aabb3, Point3};
use serde::{Deserialize, Serialize};

use crate::error::{IrError, Result};
use crate::surface::SurfaceLookup;

/// Side of a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// Where the surface equation is negative (inside spheres/cylinders).
    Negative,
    /// Where the surface equation is zero or positive.
    Positive,
}

impl Side {
    /// The other side.
    pub fn flip(self) -> Side {
        match self {
            Side::Negative => Side::Positive,
            Side::Positive => Side::Negative,
        }
    }
}

/// A boolean expression over half-spaces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Region {
    /// One side of a surface.
    Halfspace {
        /// Surface id.
        surface: u32,
        /// Which side.
        side: Side,
    },
    /// All operands.
    Intersection(Vec<Region>),
    /// Any operand.
    Union(Vec<Region>),
    /// Everything outside the operand.
    Complement(Box<Region>),
}

impl Region {
    /// Half-space of surface `surface`.
    pub fn halfspace(surface: u32, side: Side) -> Self {
        Region::Halfspace { surface, side }
    }

    /// Whether `p` is inside the region.
    pub fn contains<L: SurfaceLookup + ?Sized>(&self, p: &Point3, surfaces: &L) -> Result<bool> {
        Ok(match self {
            Region::Halfspace { surface, side } => {
                surfaces.require_surface(*surface)?.side_of(p) == *side
            }
            Region::Intersection(nodes) => {
                for node in nodes {
                    if !node.contains(p, surfaces)? {
                        return Ok(false);
                    }
                }
                true
            }
            Region::Union(nodes) => {
                for node in nodes {
                    if node.contains(p, surfaces)? {
                        return Ok(true);
                    }
                }
                false
            }
            Region::Complement(node) => !node.contains(p, surfaces)?,
        })
    }

    /// Logical complement with the negation pushed down to the half-spaces.
    pub fn complement(&self) -> Region {
        match self {
            Region::Halfspace { surface, side } => Region::halfspace(*surface, side.flip()),
            Region::Intersection(nodes) => {
                Region::Union(nodes.iter().map(Region::complement).collect())
            }
            Region::Union(nodes) => {
                Region::Intersection(nodes.iter().map(Region::complement).collect())
            }
            Region::Complement(node) => (**node).clone(),
        }
    }

    /// Conservative axis-aligned bounds of the region.
    pub fn bounding_box<L: SurfaceLookup + ?Sized>(&self, surfaces: &L) -> Result<Aabb3> {
        match self {
            Region::Halfspace { surface, side } => {
                Ok(surfaces.require_surface(*surface)?.halfspace_bounds(*side))
            }
            Region::Intersection(nodes) => {
                let mut b = Aabb3::infinite();
                for node in nodes {
                    b = b.intersection(&node.bounding_box(surfaces)?);
                }
                Ok(b)
            }
            Region::Union(nodes) => {
                let mut b = Aabb3::empty();
                for node in nodes {
                    b = b.union(&node.bounding_box(surfaces)?);
                }
                Ok(b)
            }
            Region::Complement(node) => node.complement().bounding_box(surfaces),
        }
    }

    /// Ids of every referenced surface, sorted and deduplicated.
    pub fn surface_ids(&self) -> Vec<u32> {
        let mut ids = Vec::new();
        self.collect_surfaces(&mut ids);
        ids.sort_unstable();
        ids.dedup();
        ids
    }

    fn collect_surfaces(&self, out: &mut Vec<u32>) {
        match self {
            Region::Halfspace { surface, .. } => out.push(*surface),
            Region::Intersection(nodes) | Region::Union(nodes) => {
                nodes.iter().for_each(|n| n.collect_surfaces(out))
            }
            Region::Complement(node) => node.collect_surfaces(out),
        }
    }
}

impl BitAnd for Region {
    type Output = Region;

    fn bitand(self, rhs: Region) -> Region {
        match (self, rhs) {
            (Region::Intersection(mut a), Region::Intersection(b)) => {
                a.extend(b);
                Region::Intersection(a)
            }
            (Region::Intersection(mut a), r) => {
                a.push(r);
                Region::Intersection(a)
            }
            (l, Region::Intersection(mut b)) => {
                b.insert(0, l);
                Region::Intersection(b)
            }
            (l, r) => Region::Intersection(vec![l, r]),
        }
    }
}

impl BitOr for Region {
    type Output = Region;

    fn bitor(self, rhs: Region) -> Region {
        match (self, rhs) {
            (Region::Union(mut a), Region::Union(b)) => {
                a.extend(b);
                Region::Union(a)
            }
            (Region::Union(mut a), r) => {
                a.push(r);
                Region::Union(a)
            }
            (l, Region::Union(mut b)) => {
                b.insert(0, l);
                Region::Union(b)
            }
            (l, r) => Region::Union(vec![l, r]),
        }
    }
}

impl Not for Region {
    type Output = Region;

    fn not(self) -> Region {
        Region::Complement(Box::new(self))
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Region::Halfspace { surface, side } => match side {
                Side::Negative => write!(f, "-{surface}"),
                Side::Positive => write!(f, "+{surface}"),
            },
            Region::Intersection(nodes) => {
                for (i, node) in nodes.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    match node {
                        Region::Intersection(_) | Region::Union(_) => write!(f, "({node})")?,
                        _ => write!(f, "{node}")?,
                    }
                }
                Ok(())
            }
            Region::Union(nodes) => {
                for (i, node) in nodes.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" | ")?;
                    }
                    match node {
                        Region::Union(_) => write!(f, "({node})")?,
                        _ => write!(f, "{node}")?,
                    }
                }
                Ok(())
            }
            Region::Complement(node) => write!(f, "~({node})"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token {
    Halfspace(u32, Side),
    LParen,
    RParen,
    Union,
    Complement,
}

fn tokenize(expr: &str) -> std::result::Result<Vec<Token>, String> {
    let mut tokens = Vec::new();
    let mut chars = expr.char_indices().peekable();

    while let Some(&(pos, c)) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '(' | ')' | '|' | '~' => {
                chars.next();
                tokens.push(match c {
                    '(' => Token::LParen,
                    ')' => Token::RParen,
                    '|' => Token::Union,
                    _ => Token::Complement,
                });
            }
            '+' | '-' | '0'..='9' => {
                let side = if c == '-' { Side::Negative } else { Side::Positive };
                if c == '+' || c == '-' {
                    chars.next();
                }
                let mut digits = String::new();
                while let Some(&(_, d)) = chars.peek() {
                    if !d.is_ascii_digit() {
                        break;
                    }
                    digits.push(d);
                    chars.next();
                }
                let id: u32 = digits
                    .parse()
                    .map_err(|_| format!("expected surface id at offset {pos}"))?;
                if id == 0 {
                    return Err(format!("surface id 0 at offset {pos}"));
                }
                tokens.push(Token::Halfspace(id, side));
            }
            other => return Err(format!("unexpected character '{other}' at offset {pos}")),
        }
    }
    Ok(tokens)
}

/// Deepest nesting of parentheses and complements accepted by the parser.
const MAX_NESTING: usize = 256;

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).copied()
    }

    fn next(&mut self) -> Option<Token> {
        let t = self.peek();
        self.pos += 1;
        t
    }

    fn union(&mut self) -> std::result::Result<Region, String> {
        let mut nodes = vec![self.intersection()?];
        while self.peek() == Some(Token::Union) {
            self.next();
            nodes.push(self.intersection()?);
        }
        Ok(if nodes.len() == 1 {
            nodes.remove(0)
        } else {
            Region::Union(nodes)
        })
    }

    fn intersection(&mut self) -> std::result::Result<Region, String> {
        let mut nodes = vec![self.unary()?];
        while matches!(
            self.peek(),
            Some(Token::Halfspace(..) | Token::LParen | Token::Complement)
        ) {
            nodes.push(self.unary()?);
        }
        Ok(if nodes.len() == 1 {
            nodes.remove(0)
        } else {
            Region::Intersection(nodes)
        })
    }

    fn unary(&mut self) -> std::result::Result<Region, String> {
        if self.depth >= MAX_NESTING {
            return Err(format!("nesting deeper than {MAX_NESTING} levels"));
        }
        self.depth += 1;
        let region = self.operand();
        self.depth -= 1;
        region
    }

    fn operand(&mut self) -> std::result::Result<Region, String> {
        match self.next() {
            Some(Token::Halfspace(surface, side)) => Ok(Region::halfspace(surface, side)),
            Some(Token::Complement) => Ok(Region::Complement(Box::new(self.unary()?))),
            Some(Token::LParen) => {
                let inner = self.union()?;
                match self.next() {
                    Some(Token::RParen) => Ok(inner),
                    _ => Err("unbalanced parentheses".into()),
                }
            }
            Some(t) => Err(format!("unexpected {t:?}")),
            None => Err("unexpected end of expression".into()),
        }
    }
}

impl FromStr for Region {
    type Err = IrError;

    fn from_str(expr: &str) -> Result<Region> {
        let fail = |reason: String| IrError::RegionParse {
            expr: expr.to_string(),
            reason,
        };
        let tokens = tokenize(expr).map_err(fail)?;
        if tokens.is_empty() {
            return Err(fail("empty expression".into()));
        }
        let mut parser = Parser {
            tokens,
            pos: 0,
            depth: 0,
        };
        let region = parser.union().map_err(fail)?;
        if let Some(t) = parser.peek() {
            return Err(fail(match t {
                Token::RParen => "unbalanced parentheses".into(),
                other => format!("unexpected {other:?}"),
            }));
        }
        Ok(region)
    }
}

impl TryFrom<String> for Region {
    type Error = IrError;

    fn try_from(expr: String) -> Result<Region> {
        expr.parse()
    }
}

impl From<Region> for String {
    fn from(region: Region) -> String {
        region.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::Surface;

    fn neg(id: u32) -> Region {
        Region::halfspace(id, Side::Negative)
    }

    fn pos(id: u32) -> Region {
        Region::halfspace(id, Side::Positive)
    }

    #[test]
    fn test_operators_flatten() {
        let r = pos(2) & pos(6) & neg(1);
        assert_eq!(r, Region::Intersection(vec![pos(2), pos(6), neg(1)]));
        assert_eq!(r.to_string(), "+2 +6 -1");

        let u = neg(1) | neg(2) | neg(3);
        assert_eq!(u.to_string(), "-1 | -2 | -3");
    }

    #[test]
    fn test_parse_precedence() {
        let r: Region = "-1 2 | ~(3) -4".parse().unwrap();
        assert_eq!(
            r,
            Region::Union(vec![
                Region::Intersection(vec![neg(1), pos(2)]),
                Region::Intersection(vec![Region::Complement(Box::new(pos(3))), neg(4)]),
            ])
        );
    }

    #[test]
    fn test_display_parse_agree() {
        for expr in ["-5", "+4 -3 +5", "(-1 | +2) -3", "~(+1 -2) | -7", "-1 (+2 | (-3 | -4))"] {
            let r: Region = expr.parse().unwrap();
            let again: Region = r.to_string().parse().unwrap();
            assert_eq!(r, again, "{expr} -> {r}");
        }
    }

    #[test]
    fn test_parse_errors() {
        for bad in ["", "   ", "(-1", "-1)", "-0", "-a", "| -1", "-1 |", "~"] {
            let err = bad.parse::<Region>().unwrap_err();
            assert!(matches!(err, IrError::RegionParse { .. }), "{bad}: {err}");
        }
    }

    #[test]
    fn test_deep_nesting_is_an_error() {
        let deep = format!("{}-1{}", "(".repeat(200_000), ")".repeat(200_000));
        let err = deep.parse::<Region>().unwrap_err();
        assert!(matches!(err, IrError::RegionParse { .. }));
        assert!(err.to_string().contains("nesting"));

        let complements = format!("{}-1", "~".repeat(100_000));
        assert!(complements.parse::<Region>().is_err());

        let shallow = format!("{}-1{}", "(".repeat(100), ")".repeat(100));
        assert_eq!(shallow.parse::<Region>().unwrap(), Region::halfspace(1, Side::Negative));
    }

    #[test]
    fn test_complement_de_morgan() {
        let r = (neg(1) & pos(2)).complement();
        assert_eq!(r, Region::Union(vec![pos(1), neg(2)]));
        assert_eq!(Region::Complement(Box::new(neg(3))).complement(), neg(3));
    }

    #[test]
    fn test_contains_and_bounds() {
        let surfaces = vec![
            Surface::sphere(1, 10.0),
            Surface::sphere(2, 1.0),
            Surface::sphere(6, 0.1).with_center(9.8, 0.0, 0.0),
        ];
        let water = pos(2) & pos(6) & neg(1);
        assert!(water.contains(&Point3::new(5.0, 0.0, 0.0), &surfaces).unwrap());
        assert!(!water.contains(&Point3::new(0.5, 0.0, 0.0), &surfaces).unwrap());
        assert!(!water.contains(&Point3::new(9.8, 0.0, 0.0), &surfaces).unwrap());

        let b = water.bounding_box(&surfaces).unwrap();
        assert_eq!(b.corners(), ([-10.0; 3], [10.0; 3]));

        // ~(+1) is the inside of sphere 1
        let inside = !pos(1);
        assert!(inside.bounding_box(&surfaces).unwrap().is_finite());

        let missing = neg(99);
        assert!(matches!(
            missing.contains(&Point3::origin(), &surfaces),
            Err(IrError::UnknownSurface(99))
        ));
    }

    #[test]
    fn test_surface_ids() {
        let r: Region = "+4 -3 +5 | -4".parse().unwrap();
        assert_eq!(r.surface_ids(), vec![3, 4, 5]);
    }

    #[test]
    fn test_serde_as_expression() {
        let r = pos(4) & neg(3) & pos(5);
        let json = serde_json::to_string(&r).unwrap();
        assert_eq!(json, "\"+4 -3 +5\"");
        let back: Region = serde_json::from_str(&json).unwrap();
        assert_eq!(back, r);
        assert!(serde_json::from_str::<Region>("\"(1\"").is_err());
    }
}
