//! Device discovery and address resolution.
//!
//! Use [`find_devices`] to list attached adapters, or a [`Selector`] to pick
//! one by vendor/product ID and, optionally, bus number and device address.

use nusb::{self, DeviceInfo, MaybeFuture};

use crate::error::{Error, Result};

/// How a bus number or device address is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AddressSelect {
    /// Not given; matches any value.
    #[default]
    Unspecified,
    /// The highest value among matching devices.
    Last,
    /// Exactly this value.
    Exact(u8),
}

impl AddressSelect {
    /// Map a command-line integer: `0` is unspecified, `-1` means "last".
    pub fn from_arg(value: i32) -> Result<Self> {
        match value {
            0 => Ok(Self::Unspecified),
            -1 => Ok(Self::Last),
            1..=255 => Ok(Self::Exact(value as u8)),
            _ => Err(Error::InvalidArgument(
                "bus and device number must be -1 or in 0..=255",
            )),
        }
    }
}

/// Criteria for choosing one ASIX adapter.
///
/// With neither `bus` nor `device_number` set, the first enumerated device
/// with the right IDs is used. The OS does not define the enumeration order,
/// so with several identical adapters attached which one is picked may differ
/// between runs. Give a bus and device number to pin it down.
///
/// # Example
///
/// ```
/// use asix_eeprom::{AddressSelect, Selector};
///
/// let selector = Selector::new(0x0b95, 0x772b)
///     .bus(AddressSelect::Last)
///     .device_number(AddressSelect::Last);
/// assert!(selector.is_addressed());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selector {
    /// USB vendor ID to match.
    pub vendor_id: u16,
    /// USB product ID to match.
    pub product_id: u16,
    /// Bus number selection.
    pub bus: AddressSelect,
    /// Device address selection.
    pub device_number: AddressSelect,
}

impl Selector {
    /// Create a selector matching the given vendor and product IDs.
    pub fn new(vendor_id: u16, product_id: u16) -> Self {
        Self {
            vendor_id,
            product_id,
            bus: AddressSelect::Unspecified,
            device_number: AddressSelect::Unspecified,
        }
    }

    /// Restrict the bus number.
    pub fn bus(mut self, bus: AddressSelect) -> Self {
        self.bus = bus;
        self
    }

    /// Restrict the device address.
    pub fn device_number(mut self, device_number: AddressSelect) -> Self {
        self.device_number = device_number;
        self
    }

    /// Whether a bus or device number was given.
    pub fn is_addressed(&self) -> bool {
        self.bus != AddressSelect::Unspecified || self.device_number != AddressSelect::Unspecified
    }

    /// Check that vendor and product IDs are set.
    pub fn validate(&self) -> Result<()> {
        if self.vendor_id == 0 || self.product_id == 0 {
            return Err(Error::InvalidArgument("vendor and product ID must be non-zero"));
        }
        Ok(())
    }

    fn matches_ids<D: UsbLocation>(&self, dev: &D) -> bool {
        dev.vendor_id() == self.vendor_id && dev.product_id() == self.product_id
    }
}

/// Topology and identity of one enumerated USB device.
pub trait UsbLocation {
    /// USB vendor ID.
    fn vendor_id(&self) -> u16;
    /// USB product ID.
    fn product_id(&self) -> u16;
    /// Bus number the device is attached to, if the platform reports one.
    fn bus_number(&self) -> Option<u8>;
    /// Device address on its bus.
    fn device_address(&self) -> u8;
}

impl UsbLocation for DeviceInfo {
    fn vendor_id(&self) -> u16 {
        DeviceInfo::vendor_id(self)
    }

    fn product_id(&self) -> u16 {
        DeviceInfo::product_id(self)
    }

    #[cfg(any(target_os = "linux", target_os = "android"))]
    fn bus_number(&self) -> Option<u8> {
        Some(self.busnum())
    }

    #[cfg(target_os = "macos")]
    fn bus_number(&self) -> Option<u8> {
        bus_from_hex_id(self.bus_id())
    }

    // Windows reports a location path such as `PCIROOT(0)#PCI(1400)#USBROOT(0)`,
    // which carries no bus number.
    #[cfg(not(any(target_os = "linux", target_os = "android", target_os = "macos")))]
    fn bus_number(&self) -> Option<u8> {
        None
    }

    fn device_address(&self) -> u8 {
        DeviceInfo::device_address(self)
    }
}

/// Bus number from a `bus_id` of two hex digits, as IOKit reports it.
#[cfg_attr(not(target_os = "macos"), allow(dead_code))]
fn bus_from_hex_id(bus_id: &str) -> Option<u8> {
    u8::from_str_radix(bus_id, 16).ok()
}

/// Pick one device out of an enumeration snapshot.
///
/// Without a bus or device number this returns the first device with the
/// selector's IDs. Otherwise `Last` components are resolved to the highest
/// bus, then the highest address on that bus, and the device at the
/// resulting location is returned. Devices whose bus number is unknown
/// never match a bus selection.
pub fn resolve_location<'a, D: UsbLocation>(selector: &Selector, devices: &'a [D]) -> Result<&'a D> {
    let candidates = move || devices.iter().filter(move |d| selector.matches_ids(*d));

    if !selector.is_addressed() {
        return candidates().next().ok_or(Error::DeviceNotFound);
    }

    let last_bus = || {
        let last = candidates()
            .filter_map(UsbLocation::bus_number)
            .max()
            .ok_or(Error::NoMatchingBus {
                vendor_id: selector.vendor_id,
                product_id: selector.product_id,
            })?;
        log::debug!("last bus with a matching device is {last}");
        Ok::<_, Error>(last)
    };

    let bus = match selector.bus {
        AddressSelect::Unspecified => None,
        AddressSelect::Last => Some(last_bus()?),
        AddressSelect::Exact(b) => Some(b),
    };

    let address = match selector.device_number {
        AddressSelect::Unspecified => None,
        AddressSelect::Exact(a) => Some(a),
        AddressSelect::Last => {
            // A "last device" is only meaningful on a single bus.
            let on_bus = match bus {
                Some(b) => b,
                None => last_bus()?,
            };
            let last = candidates()
                .filter(|d| d.bus_number() == Some(on_bus))
                .map(UsbLocation::device_address)
                .max()
                .ok_or(Error::NoMatchingDevice { bus: on_bus })?;
            log::debug!("last matching device on bus {on_bus} is {last}");
            return candidates()
                .find(|d| d.bus_number() == Some(on_bus) && d.device_address() == last)
                .ok_or(Error::DeviceNotFound);
        }
    };

    candidates()
        .find(|d| {
            bus.map_or(true, |b| d.bus_number() == Some(b))
                && address.map_or(true, |a| d.device_address() == a)
        })
        .ok_or(Error::DeviceNotFound)
}

/// List all attached devices matching the given vendor and product IDs.
///
/// # Example
///
/// ```no_run
/// use asix_eeprom::{constants::{pid, ASIX_VID}, find_devices, UsbLocation};
///
/// for dev in find_devices(ASIX_VID, pid::AX88772B)? {
///     println!("bus {:?} device {}", dev.bus_number(), dev.device_address());
/// }
/// # Ok::<(), asix_eeprom::Error>(())
/// ```
pub fn find_devices(vendor: u16, product: u16) -> Result<Vec<DeviceInfo>> {
    let devices = nusb::list_devices()
        .wait()
        .map_err(Error::UsbInit)?
        .filter(|d| DeviceInfo::vendor_id(d) == vendor && DeviceInfo::product_id(d) == product)
        .collect();
    Ok(devices)
}

/// Find the single device described by `selector` without opening it.
pub fn find_device(selector: &Selector) -> Result<DeviceInfo> {
    selector.validate()?;

    let devices: Vec<DeviceInfo> = nusb::list_devices()
        .wait()
        .map_err(Error::UsbInit)?
        .collect();
    log::debug!("{} USB devices enumerated", devices.len());

    if selector.is_addressed()
        && devices
            .iter()
            .any(|d| selector.matches_ids(d) && d.bus_number().is_none())
    {
        log::warn!("this platform does not report USB bus numbers; bus selection cannot match");
    }

    resolve_location(selector, &devices).cloned()
}
