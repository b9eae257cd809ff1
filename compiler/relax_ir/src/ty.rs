//! Type terms.
//!
//! The type lattice the annotation and inference machinery speaks. This
//! crate only stores and compares types; subtyping and unification live in
//! the type inference pass outside this crate.

use std::fmt;

/// Element type of a tensor.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum DType {
    Bool,
    I32,
    I64,
    F32,
    F64,
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DType::Bool => write!(f, "bool"),
            DType::I32 => write!(f, "int32"),
            DType::I64 => write!(f, "int64"),
            DType::F32 => write!(f, "float32"),
            DType::F64 => write!(f, "float64"),
        }
    }
}

/// Type term.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum Type {
    /// The type of shape values (what a `ShapeExpr` evaluates to).
    Shape,

    /// Tensor with possibly unknown rank.
    ///
    /// `ndim: None` means the rank itself is unknown.
    DynTensor { ndim: Option<u32>, dtype: DType },

    /// Fixed-arity product type.
    Tuple(Vec<Type>),

    /// Function type.
    Func { params: Vec<Type>, ret: Box<Type> },
}

impl Type {
    /// Tensor type with known rank.
    pub fn tensor(ndim: u32, dtype: DType) -> Self {
        Type::DynTensor {
            ndim: Some(ndim),
            dtype,
        }
    }

    /// Tensor type with unknown rank.
    pub fn tensor_unranked(dtype: DType) -> Self {
        Type::DynTensor { ndim: None, dtype }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Shape => write!(f, "Shape"),
            Type::DynTensor { ndim, dtype } => match ndim {
                Some(n) => write!(f, "Tensor[ndim={n}, {dtype}]"),
                None => write!(f, "Tensor[ndim=?, {dtype}]"),
            },
            Type::Tuple(fields) => {
                write!(f, "(")?;
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{field}")?;
                }
                write!(f, ")")
            }
            Type::Func { params, ret } => {
                write!(f, "fn(")?;
                for (i, param) in params.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{param}")?;
                }
                write!(f, ") -> {ret}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Type::Shape), "Shape");
        assert_eq!(
            format!("{}", Type::tensor(2, DType::F32)),
            "Tensor[ndim=2, float32]"
        );
        assert_eq!(
            format!("{}", Type::tensor_unranked(DType::I64)),
            "Tensor[ndim=?, int64]"
        );
        let func = Type::Func {
            params: vec![Type::tensor(1, DType::F32), Type::Shape],
            ret: Box::new(Type::Tuple(vec![Type::Shape, Type::Shape])),
        };
        assert_eq!(
            format!("{func}"),
            "fn(Tensor[ndim=1, float32], Shape) -> (Shape, Shape)"
        );
    }

    #[test]
    fn test_structural_equality() {
        assert_eq!(Type::tensor(2, DType::F32), Type::tensor(2, DType::F32));
        assert_ne!(Type::tensor(2, DType::F32), Type::tensor(3, DType::F32));
        assert_ne!(
            Type::tensor(2, DType::F32),
            Type::tensor_unranked(DType::F32)
        );
    }
}
