// SPDX-License-Identifier: MIT
// Copyright 2026 Tyler Zervas

//! [`NativeTensor`] for `candle_core::Tensor`.
//!
//! Candle keeps every tensor strided and represents booleans as `u8` masks
//! holding `0`/`1`, so logical operations return `DType::U8` tensors.
//! Slicing follows the usual wrap-and-clamp rules: negative `dim`, `start`
//! and `end` count from the end, both bounds are clamped into the axis and
//! an empty range is not an error.

use candle_core::{DType, Device, Tensor, WithDType};

use crate::dtype::DTypeExt;
use crate::error::{BridgeError, Result};
use crate::layout::StorageLayout;
use crate::traits::NativeTensor;

impl NativeTensor for Tensor {
    fn sizes(&self) -> &[usize] {
        Tensor::dims(self)
    }

    fn scalar_type(&self) -> DType {
        Tensor::dtype(self)
    }

    fn device(&self) -> Device {
        Tensor::device(self).clone()
    }

    fn layout(&self) -> StorageLayout {
        StorageLayout::Strided
    }

    fn is_contiguous(&self) -> bool {
        Tensor::is_contiguous(self)
    }

    fn to(&self, device: &Device, dtype: DType, copy: bool) -> Result<Self> {
        let unchanged = Tensor::dtype(self) == dtype && Tensor::device(self).same_device(device);
        if unchanged {
            return if copy {
                Ok(self.copy()?)
            } else {
                Ok(self.clone())
            };
        }
        Ok(self.to_device(device)?.to_dtype(dtype)?)
    }

    fn deep_clone(&self) -> Result<Self> {
        Ok(self.copy()?)
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn slice(&self, dim: i64, start: i64, end: i64, step: i64) -> Result<Self> {
        let dim = wrap_dim(dim, self.rank())?;
        if step <= 0 {
            return Err(BridgeError::native(format!(
                "slice step must be positive, got {step}"
            )));
        }

        let size = self.dims()[dim] as i64;
        let (start, end) = clamp_range(start, end, size);
        if step == 1 {
            return Ok(self.narrow(dim, start as usize, (end - start) as usize)?);
        }

        let indices: Vec<i64> = (start..end).step_by(step as usize).collect();
        let count = indices.len();
        let ids = Tensor::from_vec(indices, count, Tensor::device(self))?;
        Ok(self.index_select(&ids, dim)?)
    }

    #[allow(clippy::cast_possible_wrap)]
    fn masked_select(&self, mask: &Self) -> Result<Self> {
        if mask.dtype() != DType::U8 {
            return Err(BridgeError::native(format!(
                "masked_select expects a boolean (u8) mask, got {}",
                mask.dtype().name()
            )));
        }

        let shape = Tensor::shape(self).broadcast_shape_binary_op(mask.shape(), "masked_select")?;
        let flags = mask.broadcast_as(&shape)?.flatten_all()?.to_vec1::<u8>()?;
        let indices: Vec<i64> = flags
            .iter()
            .enumerate()
            .filter(|(_, flag)| **flag != 0)
            .map(|(i, _)| i as i64)
            .collect();
        let count = indices.len();
        let ids = Tensor::from_vec(indices, count, Tensor::device(self))?;
        Ok(self.broadcast_as(&shape)?.flatten_all()?.index_select(&ids, 0)?)
    }

    fn data_bytes(&self) -> Result<Vec<u8>> {
        let flat = self.flatten_all()?;
        match self.dtype() {
            DType::U8 => Ok(flat.to_vec1::<u8>()?),
            DType::U32 => le_bytes(&flat, u32::to_le_bytes),
            DType::I16 => le_bytes(&flat, i16::to_le_bytes),
            DType::I32 => le_bytes(&flat, i32::to_le_bytes),
            DType::I64 => le_bytes(&flat, i64::to_le_bytes),
            DType::BF16 => le_bytes(&flat, half::bf16::to_le_bytes),
            DType::F16 => le_bytes(&flat, half::f16::to_le_bytes),
            DType::F32 => le_bytes(&flat, f32::to_le_bytes),
            DType::F64 => le_bytes(&flat, f64::to_le_bytes),
            #[allow(unreachable_patterns)]
            other => Err(BridgeError::native(format!(
                "reading raw bytes is not supported for dtype {}",
                other.name()
            ))),
        }
    }

    fn logical_xor(&self, other: &Self) -> Result<Self> {
        let lhs = self.ne(&self.zeros_like()?)?;
        let rhs = other.ne(&other.zeros_like()?)?;
        Ok(lhs.broadcast_ne(&rhs)?)
    }

    fn logical_not(&self) -> Result<Self> {
        Ok(self.eq(&self.zeros_like()?)?)
    }
}

fn le_bytes<T: WithDType, const N: usize>(flat: &Tensor, to_le: fn(T) -> [u8; N]) -> Result<Vec<u8>> {
    Ok(flat.to_vec1::<T>()?.into_iter().flat_map(to_le).collect())
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_possible_wrap)]
fn wrap_dim(dim: i64, rank: usize) -> Result<usize> {
    let rank = rank as i64;
    let wrapped = if dim < 0 { dim.saturating_add(rank) } else { dim };
    if rank == 0 || !(0..rank).contains(&wrapped) {
        return Err(BridgeError::native(format!(
            "Dimension out of range (expected to be in range of [{}, {}], but got {dim})",
            -rank,
            rank - 1
        )));
    }
    Ok(wrapped as usize)
}

fn clamp_range(start: i64, end: i64, size: i64) -> (i64, i64) {
    let wrap = |i: i64| if i < 0 { i.saturating_add(size) } else { i };
    let start = wrap(start).clamp(0, size);
    let end = wrap(end).clamp(start, size);
    (start, end)
}
