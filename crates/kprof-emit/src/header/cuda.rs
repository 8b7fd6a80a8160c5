//! Enabled profiler header generation (CUDA).
//!
//! Bit layout constants are taken from `kprof_format` so the generated device
//! code, the Rust writer and decoders cannot drift apart.

use kprof_format::{
    EVENT_BEGIN, EVENT_END, EVENT_IDX_SHIFT, EVENT_INSTANT, GROUP_IDX_SHIFT, HEADER_WORDS,
    HIGH_HALF_SHIFT,
};

use crate::config::ProfilerConfig;

#[must_use]
pub fn gen_profiler_cuda(config: &ProfilerConfig) -> String {
    let buf = &config.buffer_param;
    format!(
        r#"/* Kernel profiler - device-side event tracing.
 *
 * Buffer layout (64-bit words):
 *   word 0            group count in the low 32 bits; high 32 bits unspecified
 *   word 1 + g + k*G  k-th record of group g, G = group count
 * Record: tag in the low 32 bits, timestamp in the high 32 bits.
 * Tag: (group << BLOCK_IDX_SHIFT) | (slot << EVENT_IDX_SHIFT) | type.
 *
 * PROFILER_EVENT_INSTANT does not advance the write pointer; the next event of
 * the same group overwrites it.
 */
#pragma once

#include <stdint.h>

#define KPROF_ENABLED 1

constexpr uint32_t EVENT_IDX_SHIFT = {EVENT_IDX_SHIFT};
constexpr uint32_t BLOCK_IDX_SHIFT = {GROUP_IDX_SHIFT};

constexpr uint32_t EVENT_BEGIN = {EVENT_BEGIN:#x};
constexpr uint32_t EVENT_END = {EVENT_END:#x};
constexpr uint32_t EVENT_INSTANT = {EVENT_INSTANT:#x};

__device__ __forceinline__ uint32_t get_block_idx() {{
    return (blockIdx.z * gridDim.y + blockIdx.y) * gridDim.x + blockIdx.x;
}}

__device__ __forceinline__ uint32_t get_num_blocks() {{
    return gridDim.x * gridDim.y * gridDim.z;
}}

__device__ __forceinline__ uint32_t get_thread_idx() {{
    return (threadIdx.z * blockDim.y + threadIdx.y) * blockDim.x + threadIdx.x;
}}

__device__ __forceinline__ uint32_t encode_tag(uint32_t block_idx, uint32_t event_idx,
                                               uint32_t event_type) {{
    return (block_idx << BLOCK_IDX_SHIFT) | (event_idx << EVENT_IDX_SHIFT) | event_type;
}}

__device__ __forceinline__ uint64_t pack_entry(uint32_t tag, uint32_t delta_time) {{
    return ((uint64_t)delta_time << {HIGH_HALF_SHIFT}) | (uint64_t)tag;
}}

__device__ __forceinline__ uint32_t get_timestamp() {{
    volatile uint32_t ret;
    asm volatile("mov.u32 %0, %globaltimer_lo;" : "=r"(ret));
    return ret;
}}

/* Declarations above are emitted at file scope. */
#define PROFILER_INCLUDE_ALL_DECL

#define PROFILER_ADDITIONAL_FUNC_PARAMS , void* {buf}
#define PROFILER_ADDITIONAL_FUNC_PARAMS_ARGS , {buf}
#define PROFILER_ADDITIONAL_PARAMS_SETTER profiler_buffer_ptr = static_cast<uint64_t*>({buf});

#define PROFILER_PARAMS_DECL uint64_t* profiler_buffer_ptr;

#define PROFILER_CLOSURE_PARAMS_DECL \
  uint64_t* profiler_write_ptr;      \
  uint32_t profiler_write_stride;    \
  uint32_t profiler_entry_tag_base;  \
  bool profiler_write_thread_predicate;

/* Lane 0 of each group stores only the header's low half. */
#define PROFILER_INIT(profiler_buffer, write_thread_predicate)                    \
  if (get_thread_idx() == 0) {{                                                  \
    reinterpret_cast<uint32_t*>(profiler_buffer)[0] = get_num_blocks();          \
  }}                                                                             \
  profiler_write_ptr = (profiler_buffer) + {HEADER_WORDS} + get_block_idx();      \
  profiler_write_stride = get_num_blocks();                                      \
  profiler_entry_tag_base = encode_tag(get_block_idx(), 0, 0);                   \
  profiler_write_thread_predicate = (write_thread_predicate);

#define PROFILER_RECORD(event, type)                                             \
  *profiler_write_ptr = pack_entry(                                              \
      profiler_entry_tag_base | ((uint32_t)(event) << EVENT_IDX_SHIFT) | (type), \
      get_timestamp());

#define PROFILER_EVENT_START(event)                                              \
  if (profiler_write_thread_predicate) {{                                        \
    PROFILER_RECORD(event, EVENT_BEGIN)                                          \
    profiler_write_ptr += profiler_write_stride;                                 \
  }}                                                                             \
  __threadfence_block();

#define PROFILER_EVENT_END(event)                                                \
  __threadfence_block();                                                         \
  if (profiler_write_thread_predicate) {{                                        \
    PROFILER_RECORD(event, EVENT_END)                                            \
    profiler_write_ptr += profiler_write_stride;                                 \
  }}

#define PROFILER_EVENT_INSTANT(event)                                            \
  __threadfence_block();                                                         \
  if (profiler_write_thread_predicate) {{                                        \
    PROFILER_RECORD(event, EVENT_INSTANT)                                        \
  }}                                                                             \
  __threadfence_block();
"#
    )
}
