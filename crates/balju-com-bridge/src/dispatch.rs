//! Late-bound IDispatch access for driving Excel.
//!
//! Excel's automation API is reached through IDispatch. Every call funnels
//! through [`DispatchObject::call`], which resolves the member name and runs
//! `Invoke` with the right flags.

#![cfg(windows)]

use std::mem::ManuallyDrop;
use std::ptr;

use windows::{
    core::{BSTR, GUID, HSTRING, PCWSTR},
    Win32::{
        Foundation::{DISP_E_EXCEPTION, DISP_E_PARAMNOTFOUND, VARIANT_BOOL},
        Globalization::GetSystemDefaultLCID,
        System::{
            Com::{
                CLSIDFromProgID, CoCreateInstance, IDispatch, CLSCTX_LOCAL_SERVER, DISPATCH_FLAGS,
                DISPATCH_METHOD, DISPATCH_PROPERTYGET, DISPATCH_PROPERTYPUT, DISPPARAMS,
                EXCEPINFO,
            },
            Ole::DISPID_PROPERTYPUT,
            Variant::{
                VARIANT, VT_BOOL, VT_BSTR, VT_DISPATCH, VT_EMPTY, VT_ERROR, VT_I2, VT_I4, VT_NULL,
                VT_R4, VT_R8,
            },
        },
    },
};

// VARIANT wraps its unions in ManuallyDrop, so fields are set with ptr::write.

/// A VARIANT holding a bool.
pub fn variant_bool(val: bool) -> VARIANT {
    unsafe {
        let mut v = VARIANT::default();
        let inner = &mut *v.Anonymous.Anonymous;
        ptr::write(&mut inner.vt, VT_BOOL);
        ptr::write(
            &mut inner.Anonymous.boolVal,
            VARIANT_BOOL(if val { -1 } else { 0 }),
        );
        v
    }
}

/// A VARIANT holding an i32.
pub fn variant_i32(val: i32) -> VARIANT {
    unsafe {
        let mut v = VARIANT::default();
        let inner = &mut *v.Anonymous.Anonymous;
        ptr::write(&mut inner.vt, VT_I4);
        ptr::write(&mut inner.Anonymous.lVal, val);
        v
    }
}

/// A VARIANT holding a BSTR.
pub fn variant_str(val: &str) -> VARIANT {
    unsafe {
        let bstr = BSTR::from(val);
        let mut v = VARIANT::default();
        let inner = &mut *v.Anonymous.Anonymous;
        ptr::write(&mut inner.vt, VT_BSTR);
        ptr::write(&mut inner.Anonymous.bstrVal, ManuallyDrop::new(bstr));
        v
    }
}

/// A VARIANT holding an object reference.
pub fn variant_object(obj: &DispatchObject) -> VARIANT {
    unsafe {
        let mut v = VARIANT::default();
        let inner = &mut *v.Anonymous.Anonymous;
        ptr::write(&mut inner.vt, VT_DISPATCH);
        ptr::write(
            &mut inner.Anonymous.pdispVal,
            ManuallyDrop::new(Some(obj.inner.clone())),
        );
        v
    }
}

/// The "argument omitted" marker for optional positional parameters.
pub fn variant_missing() -> VARIANT {
    unsafe {
        let mut v = VARIANT::default();
        let inner = &mut *v.Anonymous.Anonymous;
        ptr::write(&mut inner.vt, VT_ERROR);
        ptr::write(&mut inner.Anonymous.scode, DISP_E_PARAMNOTFOUND.0);
        v
    }
}

fn variant_vt(v: &VARIANT) -> u16 {
    unsafe { v.Anonymous.Anonymous.vt.0 }
}

/// Numeric value of a VARIANT, if it holds a number.
pub fn variant_get_f64(v: &VARIANT) -> Option<f64> {
    unsafe {
        let vt = v.Anonymous.Anonymous.vt;
        let anon = &v.Anonymous.Anonymous.Anonymous;
        if vt == VT_R8 {
            Some(anon.dblVal)
        } else if vt == VT_R4 {
            Some(anon.fltVal as f64)
        } else if vt == VT_I4 {
            Some(anon.lVal as f64)
        } else if vt == VT_I2 {
            Some(anon.iVal as f64)
        } else {
            None
        }
    }
}

fn variant_get_dispatch(v: &VARIANT) -> Option<IDispatch> {
    unsafe {
        if v.Anonymous.Anonymous.vt == VT_DISPATCH {
            let disp: &Option<IDispatch> = &v.Anonymous.Anonymous.Anonymous.pdispVal;
            disp.clone()
        } else {
            None
        }
    }
}

fn variant_is_empty(v: &VARIANT) -> bool {
    unsafe {
        let vt = v.Anonymous.Anonymous.vt;
        vt == VT_EMPTY || vt == VT_NULL
    }
}

/// An IDispatch COM object.
#[derive(Clone)]
pub struct DispatchObject {
    inner: IDispatch,
}

impl DispatchObject {
    /// Create a COM object from a ProgID string (e.g. "Excel.Application").
    pub fn create_from_progid(progid: &str) -> Result<Self, String> {
        unsafe {
            let hstr = HSTRING::from(progid);
            let clsid =
                CLSIDFromProgID(&hstr).map_err(|e| format!("CLSIDFromProgID failed: {e}"))?;
            let inner: IDispatch = CoCreateInstance(&clsid, None, CLSCTX_LOCAL_SERVER)
                .map_err(|e| format!("CoCreateInstance failed for '{progid}': {e}"))?;
            Ok(Self { inner })
        }
    }

    fn dispid(&self, name: &str) -> Result<i32, String> {
        unsafe {
            let wide: Vec<u16> = name.encode_utf16().chain(std::iter::once(0)).collect();
            let names = [PCWSTR(wide.as_ptr())];
            let mut dispid = 0i32;
            self.inner
                .GetIDsOfNames(
                    &GUID::zeroed(),
                    names.as_ptr(),
                    1,
                    GetSystemDefaultLCID(),
                    &mut dispid,
                )
                .map_err(|e| format!("GetIDsOfNames('{name}') failed: {e}"))?;
            Ok(dispid)
        }
    }

    /// Invoke `name`. `args` are in natural order; DISPPARAMS wants them
    /// reversed. Property puts pass the value as the single named argument.
    fn call(&self, name: &str, flags: DISPATCH_FLAGS, args: &[VARIANT]) -> Result<VARIANT, String> {
        let dispid = self.dispid(name)?;
        let is_put = flags == DISPATCH_PROPERTYPUT;

        unsafe {
            let mut reversed: Vec<VARIANT> = args.iter().rev().cloned().collect();
            let mut named = [DISPID_PROPERTYPUT];
            let params = DISPPARAMS {
                rgvarg: if reversed.is_empty() {
                    ptr::null_mut()
                } else {
                    reversed.as_mut_ptr()
                },
                rgdispidNamedArgs: if is_put {
                    named.as_mut_ptr()
                } else {
                    ptr::null_mut()
                },
                cArgs: reversed.len() as u32,
                cNamedArgs: u32::from(is_put),
            };

            let mut result = VARIANT::default();
            let mut except = EXCEPINFO::default();
            self.inner
                .Invoke(
                    dispid,
                    &GUID::zeroed(),
                    GetSystemDefaultLCID(),
                    flags,
                    &params,
                    if is_put { None } else { Some(&mut result) },
                    Some(&mut except),
                    None,
                )
                .map_err(|e| invoke_error(e, &except, name))?;
            Ok(result)
        }
    }

    /// `obj.Name`
    pub fn get(&self, name: &str) -> Result<VARIANT, String> {
        self.call(name, DISPATCH_PROPERTYGET, &[])
    }

    /// `obj.Name = value`
    pub fn put(&self, name: &str, value: VARIANT) -> Result<(), String> {
        self.call(name, DISPATCH_PROPERTYPUT, &[value])?;
        Ok(())
    }

    /// `obj.Name(args...)` as a method call
    pub fn invoke(&self, name: &str, args: &[VARIANT]) -> Result<VARIANT, String> {
        self.call(name, DISPATCH_METHOD, args)
    }

    /// `obj.Name` where the property is an object
    pub fn child(&self, name: &str) -> Result<DispatchObject, String> {
        let v = self.get(name)?;
        to_object(&v, name)
    }

    /// `obj.Name(index)` where the indexed property is an object,
    /// e.g. `Worksheets("발주내역")` or `Range("A1")`
    pub fn item(&self, name: &str, index: VARIANT) -> Result<DispatchObject, String> {
        let v = self.call(name, DISPATCH_PROPERTYGET, &[index])?;
        to_object(&v, name)
    }

    /// A method call returning an object, e.g. `Workbooks.Open(path)`
    pub fn invoke_object(&self, name: &str, args: &[VARIANT]) -> Result<DispatchObject, String> {
        let v = self.invoke(name, args)?;
        to_object(&v, name)
    }

    /// A numeric property as i64
    pub fn get_number(&self, name: &str) -> Result<i64, String> {
        let v = self.get(name)?;
        variant_get_f64(&v)
            .map(|n| n as i64)
            .ok_or_else(|| format!("'{name}' is not a number (VT={})", variant_vt(&v)))
    }
}

fn to_object(variant: &VARIANT, context: &str) -> Result<DispatchObject, String> {
    if let Some(inner) = variant_get_dispatch(variant) {
        Ok(DispatchObject { inner })
    } else if variant_is_empty(variant) {
        Err(format!("'{context}' returned empty/null"))
    } else {
        Err(format!(
            "'{context}' returned non-object VARIANT (VT={}), expected VT_DISPATCH",
            variant_vt(variant)
        ))
    }
}

fn invoke_error(err: windows::core::Error, except: &EXCEPINFO, member: &str) -> String {
    if err.code().0 == DISP_E_EXCEPTION.0 {
        let desc = if except.bstrDescription.is_empty() {
            String::from("(no description)")
        } else {
            except.bstrDescription.to_string()
        };
        format!("COM exception in '{member}': {desc}")
    } else {
        format!("Invoke('{member}') failed: {err}")
    }
}
